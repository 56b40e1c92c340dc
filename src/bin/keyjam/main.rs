//! keyjam - shared terminal keyboard
//!
//! Run a relay, then one client per player:
//!
//! ```text
//! cargo run --bin keyjam-relay -- --bind 0.0.0.0:8080
//! cargo run --bin keyjam -- --server 192.168.1.10:8080
//! ```

mod app;
mod keyboard;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use app::App;
use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use keyjam::{
    engine::{control_channel, device::AudioDevice},
    net::{NetworkEventRouter, TcpTransport},
    EngineConfig, MixingEngine,
};

#[derive(Parser)]
#[command(name = "keyjam", version, about = "Play a shared keyboard with everyone on the relay")]
struct Args {
    /// Relay address
    #[arg(long, short = 's', default_value = "127.0.0.1:8080")]
    server: String,

    /// JSON file overriding engine settings (sample_rate, buffer_len, channels, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Where to write logs (the terminal is taken by the UI)
    #[arg(long, default_value = "keyjam.log")]
    log_file: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log = File::create(&args.log_file)
        .wrap_err_with(|| format!("failed to create log file {}", args.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log))
        .init();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json(&text).wrap_err("invalid engine config")?
        }
        None => EngineConfig::default(),
    };

    let (transport, inbound) = TcpTransport::connect(args.server.as_str(), config.message_capacity)
        .wrap_err_with(|| format!("could not reach relay at {}", args.server))?;

    let (tx, rx) = control_channel(&config);
    let device = AudioDevice::start(&config, MixingEngine::new(&config, rx));
    if !device.is_available() {
        return Err(eyre!("audio output is not available (see {})", args.log_file.display()));
    }

    let router = NetworkEventRouter::new(tx, transport);
    let mut app = App::new(args.server, router, inbound, device);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
