mod cli;
mod operator;

use clap::Parser;
use cli::{Cli, Command};
use dispg_provisioner::ProvisionSettings;
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn provision_user() -> anyhow::Result<()> {
    let settings = ProvisionSettings::from_env()?;
    dispg_provisioner::run(&settings).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => operator::run(cli.run).await,
        Command::ProvisionUser => provision_user().await,
    }
}
