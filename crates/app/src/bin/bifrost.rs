//! Bifrost gateway binary.

use clap::Parser;

use bifrost_app::cli::{run, Cli};
use bifrost_common::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    bifrost_app::init_tracing(&config);

    run(cli, config).await
}
