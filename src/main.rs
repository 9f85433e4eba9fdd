#![deny(rust_2018_idioms)]

use anyhow::Result;
use starsync::{
    app::{App, SyncOptions},
    config::Config,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cmd = cli::cmd();
    debug!(?cmd, "launched");

    // configuration is validated before any client exists
    let config = Config::from_env()?;
    let options = SyncOptions { prune: cmd.prune, dry_run: cmd.dry_run };
    let app = App::new(&config, options)?;

    let report = app.sync().await?;
    println!("{report}");

    debug!("exiting");
    Ok(())
}
