//! `serial-monitor`: watch a serial port and plot the numbers it prints.
//!
//! ```bash
//! # Pick a port interactively
//! serial-monitor
//!
//! # Connect straight away
//! serial-monitor --port /dev/ttyACM0 --baud 115200
//!
//! # Just list the ports
//! serial-monitor --list-ports
//! ```

use clap::Parser;
use serial_line_monitor::config::{Config, ConfigLoader};
use serial_line_monitor::connection::ConnectionManager;
use serial_line_monitor::error::MonitorResult;
use serial_line_monitor::logging::{self, LogTarget};
use serial_line_monitor::port::BaudRate;
use serial_line_monitor::tui::App;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "serial-monitor",
    version,
    about = "Serial line monitor with a live plot of numeric lines."
)]
struct Args {
    /// Port to connect to at startup (name or configured alias).
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate: 4800, 9600, 19200, 38400 or 115200.
    #[arg(short, long, value_parser = parse_baud)]
    baud: Option<BaudRate>,

    /// Configuration file, instead of the usual search locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the available ports and exit.
    #[arg(long)]
    list_ports: bool,

    /// Write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_baud(value: &str) -> Result<BaudRate, String> {
    let bps: u32 = value.parse().map_err(|_| format!("not a number: {value}"))?;
    BaudRate::try_from(bps).map_err(|e| e.to_string())
}

fn load_config(args: &Args) -> MonitorResult<Config> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let mut config = loader.into_config();

    if let Some(baud) = args.baud {
        config.serial.default_baud = baud;
    }
    if let Some(file) = &args.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(config)
}

fn main() -> MonitorResult<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let manager = ConnectionManager::new(config.serial.read_timeout());

    if args.list_ports {
        logging::init(&config.logging, LogTarget::Stderr)?;
        for port in manager.list_ports()? {
            println!("{port}");
        }
        return Ok(());
    }

    logging::init(&config.logging, LogTarget::FileOrDiscard)?;
    info!(version = env!("CARGO_PKG_VERSION"), "serial-monitor starting");

    let mut app = App::new(config, manager);
    if let Some(port) = &args.port {
        app.connect_to(port);
        if !app.manager.is_connected() {
            warn!(port = %port, "startup connection failed");
        }
    }

    app.run()?;
    info!("serial-monitor exiting");
    Ok(())
}
