//! Launch listener lifecycle

use crate::error::{HelperError, Result};
use crate::server::{build_router, AppState};
use crossbeam_channel::bounded;
use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Handle to a listener thread that is serving requests
struct RunningListener {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// HTTP listener hosted on a dedicated thread
///
/// Each listener runs a single-threaded tokio runtime, so requests are served
/// one at a time. [`LaunchService::stop`] returns only after the thread has
/// exited and the port is free again.
pub struct LaunchService {
    state: AppState,
    running: Option<RunningListener>,
}

impl LaunchService {
    /// Create a stopped service
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            running: None,
        }
    }

    /// Whether a listener is active
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Port actually bound, if running
    pub fn port(&self) -> Option<u16> {
        self.running.as_ref().map(|r| r.addr.port())
    }

    /// Bind `port` and start serving in the background
    ///
    /// Binding happens before this returns, so a port conflict is reported to
    /// the caller. A running listener is stopped first.
    pub fn start(&mut self, port: u16) -> Result<()> {
        if self.running.is_some() {
            self.stop();
        }

        let (ready_tx, ready_rx) = bounded::<Result<SocketAddr>>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_router(self.state.clone());

        let handle = thread::Builder::new()
            .name("http-listener".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = ready_tx.send(Err(HelperError::Server(e.to_string())));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
                    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
                        Ok(listener) => listener,
                        Err(e) => {
                            let _ = ready_tx.send(Err(HelperError::Bind { port, source: e }));
                            return;
                        }
                    };

                    let addr = match listener.local_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            let _ = ready_tx.send(Err(HelperError::Bind { port, source: e }));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(addr));

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            let _ = shutdown_rx.await;
                        })
                        .await
                        .unwrap_or_else(|e| error!("HTTP server error: {}", e));
                });
            })
            .map_err(|e| HelperError::Server(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(addr)) => {
                info!("HTTP server started on port {}", addr.port());
                self.running = Some(RunningListener {
                    addr,
                    shutdown_tx,
                    handle,
                });
                Ok(())
            }
            Ok(Err(e)) => {
                error!("{}", e);
                let _ = handle.join();
                Err(e)
            }
            Err(e) => {
                let _ = handle.join();
                Err(HelperError::ChannelError(e.to_string()))
            }
        }
    }

    /// Stop serving and wait for in-flight requests and the thread to finish
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        let _ = running.shutdown_tx.send(());
        if running.handle.join().is_err() {
            warn!("HTTP listener thread panicked during shutdown");
        }
        info!("HTTP server stopped.");
    }

    /// Stop, then start on `port`
    pub fn restart(&mut self, port: u16) -> Result<()> {
        self.stop();
        self.start(port)
    }
}

impl Drop for LaunchService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// True if `127.0.0.1:<port>` cannot be bound right now
pub fn is_port_in_use(port: u16) -> bool {
    StdTcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, SharedConfig};
    use crate::server::ProcessLauncher;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::sync::Arc;

    fn service(dir: &tempfile::TempDir) -> LaunchService {
        let config = SharedConfig::load(ConfigStore::new(dir.path().join("c.json")));
        LaunchService::new(AppState::new(config, Arc::new(ProcessLauncher)))
    }

    fn get(port: u16, path: &str) -> String {
        let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_status_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir);
        service.start(0).unwrap();
        let port = service.port().unwrap();

        let response = get(port, "/status");
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains(r#""status":"running""#), "{response}");

        service.stop();
        assert!(!service.is_running());
    }

    #[test]
    fn test_stop_releases_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir);
        service.start(0).unwrap();
        let port = service.port().unwrap();
        assert!(is_port_in_use(port));

        service.stop();
        assert!(!is_port_in_use(port));
    }

    #[test]
    fn test_restart_moves_to_new_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir);
        service.start(0).unwrap();
        let first = service.port().unwrap();

        let free = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        service.restart(free).unwrap();

        assert_eq!(service.port(), Some(free));
        assert!(!is_port_in_use(first));
        assert!(get(free, "/nope").starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_bind_conflict_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let holder = StdTcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let mut service = service(&dir);
        let err = service.start(port).unwrap_err();
        assert!(err.is_port_conflict());
        assert!(!service.is_running());
    }
}
