use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

use storefeed::{
    config::{Args, SyncConfig},
    firebase::{connector::Connector, credentials::ServiceAccount},
    observability, tasks, SyncResult,
};

#[actix_rt::main]
async fn main() -> ExitCode {
    dotenv().ok();
    observability::init_logging();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Status sync aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> SyncResult<()> {
    let config = SyncConfig::load(args)?;
    let account = ServiceAccount::from_env()?;
    let connector = Connector::new();

    tasks::status_sync::runner::start(&config, &connector, &account).await?;
    Ok(())
}
