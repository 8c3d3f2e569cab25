use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use tracing_subscriber::EnvFilter;

use dropwatch::{load_config, Config, DropwatchError, InstanceLock, Watcher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and environment, then exit
    #[arg(long)]
    check_config: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    // Bridge the library's `log` records into tracing
    tracing_log::LogTracer::init().expect("log tracer installed once");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dropwatch").join("config.json"))
}

fn load(args: &Args) -> Result<Config, DropwatchError> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path().ok_or_else(|| {
            dropwatch::ConfigError::Validation {
                message: "No --config given and no user config directory available".to_string(),
            }
        })?,
    };

    info!("Loading configuration from {:?}", path);
    Ok(load_config(&path)?)
}

fn run(args: Args) -> Result<(), DropwatchError> {
    let config = load(&args)?;

    if args.check_config {
        dropwatch::watcher::validate_environment(&config)?;
        info!("Configuration OK");
        return Ok(());
    }

    // The lock comes first: a second instance must exit before touching
    // any other component.
    let mut lock = InstanceLock::acquire(&config.lock_file)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            // Both SIGINT and SIGTERM land here; a repeat signal just
            // re-raises the same flag
            shutdown.store(true, Ordering::Relaxed);
        })
        .expect("signal handler installed once");
    }

    let mut watcher = Watcher::from_config(Arc::new(config), shutdown)?;
    watcher.run();

    lock.release();
    info!("dropwatch stopped");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!("Starting dropwatchd v{}", env!("CARGO_PKG_VERSION"));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
