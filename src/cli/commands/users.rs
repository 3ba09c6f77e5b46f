use clap::Args;
use std::str::FromStr;

use crate::cli::utils::output_records;
use crate::cli::OutputFormat;
use crate::filter::FilterSpec;
use crate::services::{UserService, UsersQuery};

#[derive(Args, Debug)]
pub struct UsersArgs {
    #[arg(long, help = "Case-insensitive substring of the username")]
    pub username: Option<String>,

    #[arg(long, help = "Search username, email and names")]
    pub search: Option<String>,

    #[arg(long = "filter", value_parser = FilterSpec::from_str, help = "params filter as key:op:value or key=value (repeatable)")]
    pub filters: Vec<FilterSpec>,
}

impl From<UsersArgs> for UsersQuery {
    fn from(args: UsersArgs) -> Self {
        UsersQuery {
            username: args.username,
            search: args.search,
            params_filter: Some(args.filters),
        }
    }
}

pub async fn handle(args: UsersArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let qb = UserService::build_query(&args.into())?;
    let users = UserService::connect().await?.find(qb).await?;
    output_records(&output_format, "users", &users)
}
