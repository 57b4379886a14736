//! PID lock file guarding against a second helper process

use crate::error::{HelperError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};
use tracing::{error, info, warn};

/// Lock file name inside the app folder
pub const LOCK_FILE_NAME: &str = "app_instance.lock";

/// Result of trying to take the instance lock
#[derive(Debug)]
pub enum LockOutcome {
    /// This process now owns the lock
    Acquired(InstanceLock),
    /// Another live process owns it
    AlreadyRunning(u32),
}

/// Owned instance lock; the file is removed on release or drop
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    released: bool,
}

impl InstanceLock {
    /// Take the lock at `path`, discarding it if its owner is gone
    pub fn acquire(path: impl Into<PathBuf>) -> Result<LockOutcome> {
        Self::acquire_with(path, is_process_running)
    }

    /// Take the lock with an explicit liveness check
    pub fn acquire_with<F>(path: impl Into<PathBuf>, is_alive: F) -> Result<LockOutcome>
    where
        F: Fn(u32) -> bool,
    {
        let path = path.into();
        let own_pid = std::process::id();

        if path.exists() {
            match read_pid(&path) {
                Some(pid) if pid != own_pid && is_alive(pid) => {
                    info!("Another instance is running with PID {}", pid);
                    return Ok(LockOutcome::AlreadyRunning(pid));
                }
                Some(pid) => {
                    info!("Discarding stale instance lock held by PID {}", pid);
                    remove_quietly(&path);
                }
                None => {
                    warn!("Instance lock at {:?} is unreadable, treating as stale", path);
                    remove_quietly(&path);
                }
            }
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| HelperError::lock(parent, e))?;
            }
        }

        fs::write(&path, own_pid.to_string()).map_err(|e| {
            error!("Error creating instance lock: {}", e);
            HelperError::lock(&path, e)
        })?;

        info!("Instance lock acquired at {:?}", path);
        Ok(LockOutcome::Acquired(InstanceLock {
            path,
            pid: own_pid,
            released: false,
        }))
    }

    /// Lock file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID written to the lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Remove the lock file; calling twice is harmless
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => info!("Instance lock released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!("Error removing instance lock: {}", e),
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// True if a process with `pid` exists
pub fn is_process_running(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_process(Pid::from_u32(pid))
}

fn read_pid(path: &Path) -> Option<u32> {
    match fs::read_to_string(path) {
        Ok(content) => content.trim().parse().ok(),
        Err(e) => {
            error!("Error reading instance lock file: {}", e);
            None
        }
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove stale instance lock: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(LOCK_FILE_NAME)
    }

    #[test]
    fn test_fresh_lock_writes_own_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);

        let outcome = InstanceLock::acquire_with(&path, |_| false).unwrap();
        let LockOutcome::Acquired(lock) = outcome else {
            panic!("expected lock to be acquired");
        };
        assert_eq!(lock.pid(), std::process::id());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            std::process::id().to_string()
        );
    }

    #[test]
    fn test_stale_lock_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "999999").unwrap();

        let outcome = InstanceLock::acquire_with(&path, |_| false).unwrap();
        assert!(matches!(outcome, LockOutcome::Acquired(_)));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            std::process::id().to_string()
        );
    }

    #[test]
    fn test_live_owner_blocks_second_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "4242").unwrap();

        let outcome = InstanceLock::acquire_with(&path, |pid| pid == 4242).unwrap();
        assert!(matches!(outcome, LockOutcome::AlreadyRunning(4242)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "4242");
    }

    #[test]
    fn test_corrupt_lock_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "not a pid").unwrap();

        let outcome = InstanceLock::acquire_with(&path, |_| true).unwrap();
        assert!(matches!(outcome, LockOutcome::Acquired(_)));
    }

    #[test]
    fn test_release_and_drop_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);

        let LockOutcome::Acquired(mut lock) = InstanceLock::acquire_with(&path, |_| false).unwrap()
        else {
            panic!("expected lock to be acquired");
        };
        lock.release();
        assert!(!path.exists());
        lock.release();

        {
            let _lock = InstanceLock::acquire_with(&path, |_| false).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }

    #[test]
    fn test_real_liveness_check_with_dead_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, u32::MAX.to_string()).unwrap();

        let outcome = InstanceLock::acquire(&path).unwrap();
        assert!(matches!(outcome, LockOutcome::Acquired(_)));
    }
}
