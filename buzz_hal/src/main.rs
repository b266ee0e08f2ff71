//! # Buzz HAL Binary
//!
//! Runs the buzzer panel until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Stock wiring on the simulation platform, interactive console on stdin
//! buzz_hal --simulate
//!
//! # Explicit configuration and platform
//! buzz_hal --config /etc/buzz/buzzer.toml --platform simulation
//!
//! # Verbose JSON logging
//! buzz_hal -s -v --json
//! ```

use buzz_common::config::LogLevel;
use buzz_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_PLATFORM};
use buzz_common::gpio::config::SystemConfig;
use buzz_common::gpio::platform::Platform;
use buzz_hal::core::BuzzerSystem;
use buzz_hal::error::SystemError;
use buzz_hal::platform_registry::PlatformRegistry;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Buzz HAL - first-press-wins buzzer lockout over GPIO interrupts
#[derive(Parser, Debug)]
#[command(name = "buzz_hal")]
#[command(version)]
#[command(about = "Interrupt-driven buzzer lockout")]
#[command(long_about = None)]
struct Args {
    /// Path to buzzer.toml. Defaults to /etc/buzz/buzzer.toml if present,
    /// else the stock two-buzzer wiring.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force the simulation platform and read console commands from stdin
    #[arg(short = 's', long)]
    simulate: bool,

    /// Platform to load (overrides the config file)
    #[arg(short, long)]
    platform: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("Buzz HAL failed: {}", e);
        std::process::exit(exit_status(&*e));
    }
}

/// Positive errno for the process exit status.
fn exit_status(err: &(dyn std::error::Error + 'static)) -> i32 {
    err.downcast_ref::<SystemError>()
        .map(|e| -e.code())
        .unwrap_or(1)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref());
    setup_tracing(&args, config.as_ref().ok().map(|c| c.shared.log_level));
    let mut config = config?;

    info!("Buzz HAL v{} starting...", env!("CARGO_PKG_VERSION"));

    if args.simulate {
        info!("Simulation mode enabled");
        config.platform = DEFAULT_PLATFORM.to_string();
    } else if let Some(platform) = &args.platform {
        config.platform = platform.clone();
    }

    let registry = PlatformRegistry::with_builtin();
    let mut system = BuzzerSystem::from_registry(config, &registry)?;
    system.init()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    if args.simulate {
        spawn_console(Arc::clone(system.platform()), Arc::clone(&running))?;
    }

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    system.teardown();
    info!("Buzz HAL shutdown complete");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SystemConfig, SystemError> {
    match path {
        Some(path) => BuzzerSystem::load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            BuzzerSystem::load_config(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => Ok(SystemConfig::default()),
    }
}

/// Forward stdin lines to the platform console until `quit` or EOF.
fn spawn_console(
    platform: Arc<dyn Platform>,
    running: Arc<AtomicBool>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }
                if command == "quit" {
                    break;
                }
                match platform.handle_custom_command(command) {
                    Some(reply) => {
                        let _ = stdout.write_all(reply.as_bytes());
                        let _ = stdout.flush();
                    }
                    None => warn!("Unknown console command: {}", command),
                }
            }
            running.store(false, Ordering::SeqCst);
        })
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: Option<LogLevel>) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.unwrap_or_default().as_directive()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
