pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ais")]
#[command(about = "AIS admin CLI - manage users and requests directly against the database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create the configured superuser if it does not exist yet")]
    InitAdmin,

    #[command(about = "List users, optionally filtered")]
    Users(commands::users::UsersArgs),

    #[command(about = "List requests, optionally filtered")]
    Requests(commands::requests::RequestsArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::InitAdmin => commands::init_admin::handle(output_format).await,
        Commands::Users(args) => commands::users::handle(args, output_format).await,
        Commands::Requests(args) => commands::requests::handle(args, output_format).await,
    };

    crate::database::DatabaseManager::close().await;
    result
}
