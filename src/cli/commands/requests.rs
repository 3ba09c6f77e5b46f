use clap::Args;
use std::str::FromStr;

use crate::cli::utils::output_records;
use crate::cli::OutputFormat;
use crate::filter::FilterSpec;
use crate::services::{RequestService, RequestsQuery};

#[derive(Args, Debug)]
pub struct RequestsArgs {
    #[arg(long, help = "Exact status: processed, await, accept or reject")]
    pub status: Option<String>,

    #[arg(long, help = "Search text, params and the owner's username")]
    pub search: Option<String>,

    #[arg(long = "filter", value_parser = FilterSpec::from_str, help = "params filter as key:op:value or key=value (repeatable)")]
    pub filters: Vec<FilterSpec>,
}

impl From<RequestsArgs> for RequestsQuery {
    fn from(args: RequestsArgs) -> Self {
        RequestsQuery {
            status: args.status,
            search: args.search,
            params_filter: Some(args.filters),
        }
    }
}

pub async fn handle(args: RequestsArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let qb = RequestService::build_query(&args.into())?;
    let requests = RequestService::connect().await?.find(qb).await?;
    output_records(&output_format, "requests", &requests)
}
