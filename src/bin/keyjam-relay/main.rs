//! keyjam-relay - rebroadcasts note events between keyjam clients
//!
//! ```text
//! cargo run --bin keyjam-relay -- --bind 0.0.0.0:8080
//! ```

mod relay;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use relay::Relay;

#[derive(Parser)]
#[command(name = "keyjam-relay", version, about = "Relay note events between keyjam players")]
struct Args {
    /// Address to listen on
    #[arg(long, short = 'b', default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let relay = Relay::bind(args.bind.as_str())
        .await
        .wrap_err_with(|| format!("failed to listen on {}", args.bind))?;
    tracing::info!(addr = %relay.local_addr()?, "relay listening");

    relay.run().await.wrap_err("relay stopped")
}
