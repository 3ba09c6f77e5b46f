use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let url = DatabaseManager::database_url()?;
    DatabaseManager::migrate().await?;
    output_success(
        &output_format,
        "Migrations applied",
        Some(serde_json::json!({ "database": DatabaseManager::redacted(&url)? })),
    )
}
