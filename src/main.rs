//! vlc-mpc-helper - headless CLI for the Open in VLC / MPC-HC helper

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vlc_mpc_helper::config::{Args, Command, ConfigStore};
use vlc_mpc_helper::instance::{InstanceLock, LockOutcome};
use vlc_mpc_helper::player::{Player, PlayerLocator};
use vlc_mpc_helper::HelperService;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args)?;

    let store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location(),
    };

    // Execute command
    match args.command.unwrap_or_default() {
        Command::Serve => cmd_serve(store),
        Command::Detect => cmd_detect(),
        Command::Config => cmd_config(&store),
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let level = args.log_level();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if let Some(log_file) = &args.log {
        let file = std::fs::File::create(log_file)
            .with_context(|| format!("Failed to create log file {}", log_file))?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Run the launch listener until Ctrl+C
fn cmd_serve(store: ConfigStore) -> Result<()> {
    let service = HelperService::load(store);

    let mut lock = match InstanceLock::acquire(service.lock_path())? {
        LockOutcome::Acquired(lock) => lock,
        LockOutcome::AlreadyRunning(pid) => {
            println!("Helper is already running (PID {}).", pid);
            return Ok(());
        }
    };

    service.detect_missing_players(&PlayerLocator::system());

    let port = service.config().snapshot().port;
    if service.configured_port_in_use() {
        error!(
            "Port {} is already in use by another application. Please change it in settings/config.",
            port
        );
        lock.release();
        std::process::exit(1);
    }

    if let Err(e) = service.start_listener() {
        lock.release();
        return Err(e.into());
    }

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    println!(
        "Listening on http://127.0.0.1:{}/ - press Ctrl+C to stop.",
        service.listener_port().unwrap_or(port)
    );

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    service.shutdown();
    lock.release();
    info!("Exiting program.");
    Ok(())
}

/// Print detected player executables
fn cmd_detect() -> Result<()> {
    let locator = PlayerLocator::system();

    println!("Detected media players:\n");
    for player in Player::ALL {
        let path = locator.detect(player);
        if path.is_empty() {
            println!("  {:<7} not found", player.display_name());
        } else {
            println!("  {:<7} {}", player.display_name(), path);
        }
    }
    println!();

    Ok(())
}

/// Show configuration file location and values
fn cmd_config(store: &ConfigStore) -> Result<()> {
    let config = store.load();

    println!("Configuration file: {}\n", store.path().display());
    println!("  mpc_path:   {}", config.mpc_path);
    println!("  vlc_path:   {}", config.vlc_path);
    println!("  port:       {}", config.port);
    println!("  auto_start: {}", config.auto_start);

    Ok(())
}
