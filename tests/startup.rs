//! Config file, instance lock and listener working together the way a
//! helper process uses them at startup.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};

use vlc_mpc_helper::config::{ConfigStore, HelperConfig, CONFIG_FILE_NAME, DEFAULT_PORT};
use vlc_mpc_helper::instance::{InstanceLock, LockOutcome};
use vlc_mpc_helper::service::SettingsForm;
use vlc_mpc_helper::HelperService;

fn free_port() -> u16 {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn service(dir: &tempfile::TempDir) -> HelperService {
    HelperService::load(ConfigStore::new(dir.path().join(CONFIG_FILE_NAME)))
        .with_auto_start(|_| Ok(()))
}

fn http_get(port: u16, path: &str) -> String {
    let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
    write!(
        stream,
        "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )
    .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[test]
fn config_file_uses_snake_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(CONFIG_FILE_NAME));
    store
        .save(&HelperConfig {
            mpc_path: "mpc.exe".into(),
            vlc_path: "vlc.exe".into(),
            port: 31000,
            auto_start: false,
        })
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["mpc_path"], "mpc.exe");
    assert_eq!(raw["vlc_path"], "vlc.exe");
    assert_eq!(raw["port"], 31000);
    assert_eq!(raw["auto_start"], false);
}

#[test]
fn fresh_install_starts_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let config = service.config().snapshot();

    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.auto_start);
    assert!(!config.players_configured());
}

#[test]
fn lock_file_holds_pid_and_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);

    let lock = match InstanceLock::acquire(service.lock_path()).unwrap() {
        LockOutcome::Acquired(lock) => lock,
        LockOutcome::AlreadyRunning(pid) => panic!("unexpected running instance {pid}"),
    };

    let raw = std::fs::read_to_string(service.lock_path()).unwrap();
    assert_eq!(raw.trim(), std::process::id().to_string());

    drop(lock);
    assert!(!service.lock_path().exists());
}

#[test]
fn listener_serves_status_and_follows_port_change() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let port = free_port();
    service.config().update(|c| c.port = port).unwrap();
    service.start_listener().unwrap();

    let response = http_get(port, "/status");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("\"status\":\"running\""), "{response}");

    let new_port = free_port();
    let form = SettingsForm {
        port: new_port.to_string(),
        ..SettingsForm::from_config(&service.config().snapshot())
    };
    let outcome = service.apply_settings(&form).unwrap();
    outcome.restart.unwrap().join().unwrap();

    let response = http_get(new_port, "/launch?player=vlc&media_url=x");
    assert!(response.starts_with("HTTP/1.1 400"), "{response}");
    assert!(TcpStream::connect((Ipv4Addr::LOCALHOST, port)).is_err());

    service.shutdown();
}
