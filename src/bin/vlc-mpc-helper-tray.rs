//! Open in VLC / MPC-HC system tray helper
//!
//! Run with `--debug` to show a console window with log output.

#![cfg_attr(windows, windows_subsystem = "windows")]

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use std::env;
    use std::sync::Arc;
    use tracing::error;
    use tracing_subscriber::EnvFilter;
    use vlc_mpc_helper::config::ConfigStore;
    use vlc_mpc_helper::instance::{bring_settings_window_to_front, InstanceLock, LockOutcome};
    use vlc_mpc_helper::tray::{show_error, TrayApp};
    use vlc_mpc_helper::HelperService;

    let debug_mode = env::args().any(|arg| arg == "--debug" || arg == "-d");

    if debug_mode {
        unsafe {
            windows::Win32::System::Console::AllocConsole()?;
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();

        println!("Starting Open in VLC / MPC-HC helper (debug mode)...");
    }

    let service = Arc::new(HelperService::load(ConfigStore::default_location()));

    let lock = match InstanceLock::acquire(service.lock_path()) {
        Ok(LockOutcome::Acquired(lock)) => lock,
        Ok(LockOutcome::AlreadyRunning(pid)) => {
            tracing::info!("Helper already running with PID {}", pid);
            bring_settings_window_to_front();
            return Ok(());
        }
        Err(e) => {
            error!("Failed to create lock file: {}", e);
            show_error(None, "Startup Error", &e.to_string());
            std::process::exit(1);
        }
    };

    let mut app = TrayApp::new(service, lock)?;

    let quit_tx = app.quit_sender();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = quit_tx.try_send(());
    }) {
        error!("Failed to install Ctrl+C handler: {}", e);
    }

    app.run()
}

#[cfg(not(windows))]
fn main() {
    eprintln!("The tray helper is only available on Windows; use `vlc-mpc-helper serve` instead.");
    std::process::exit(1);
}
