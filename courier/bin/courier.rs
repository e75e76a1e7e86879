use std::path::PathBuf;

use clap::Parser;
use courier::Config;

#[derive(Parser)]
#[command(version, about = "Bulk-SMS distribution service")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "courier.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_common::logging::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    courier::run(config).await
}
