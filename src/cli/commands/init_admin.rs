use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::CONFIG;
use crate::services::{init_admin, BootstrapOutcome, UserService};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserService::connect().await?;
    let outcome = init_admin(&users, &CONFIG.bootstrap).await?;
    let (message, data) = report(&outcome);
    output_success(&output_format, &message, Some(data))
}

/// Both outcomes are successful runs; an existing superuser is left untouched.
fn report(outcome: &BootstrapOutcome) -> (String, Value) {
    match outcome {
        BootstrapOutcome::Created(user) => (
            format!("Superuser {} created", user.username),
            json!({ "id": user.id, "username": user.username, "created": true }),
        ),
        BootstrapOutcome::AlreadyExists(username) => (
            format!("Superuser {} already exists", username),
            json!({ "username": username, "created": false }),
        ),
    }
}
