use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(Value::Object(extra)), Some(map)) = (data, response.as_object_mut()) {
                map.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a list of records: a JSON array, or one `Display` line per record.
pub fn output_records<T>(output_format: &OutputFormat, collection_name: &str, records: &[T]) -> anyhow::Result<()>
where
    T: Serialize + std::fmt::Display,
{
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: records }))?);
        }
        OutputFormat::Text if records.is_empty() => {
            println!("No {} found", collection_name);
        }
        OutputFormat::Text => {
            for record in records {
                println!("{}", record);
            }
            println!("({} {})", records.len(), collection_name);
        }
    }
    Ok(())
}
