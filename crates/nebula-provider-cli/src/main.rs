use anyhow::Result;
use clap::Parser as _;
use command::Cli;

mod command;
mod config;
mod logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.logger_config());

    cli.run().await?;

    Ok(())
}
