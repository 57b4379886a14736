//! Spawning media player processes

use std::process::{Command, Stdio};
use tracing::info;

/// Starts a player executable with a single media argument
pub trait Launcher: Send + Sync {
    /// Spawn `program media_url` without waiting for it, returning the child PID
    fn launch(&self, program: &str, media_url: &str) -> std::io::Result<u32>;
}

/// Launcher backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Detached `program media_url` with no inherited stdio
    fn command(program: &str, media_url: &str) -> Command {
        let mut command = Command::new(program);
        command
            .arg(media_url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            use windows::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS};
            command.creation_flags((DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP).0);
        }

        command
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, program: &str, media_url: &str) -> std::io::Result<u32> {
        // Dropping the Child handle leaves the player running.
        let child = Self::command(program, media_url).spawn()?;
        info!("Launched {} (PID {})", program, child.id());
        Ok(child.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_url_is_the_only_argument() {
        let url = "https://example.com/watch?v=1&list=2 with space";
        let command = ProcessLauncher::command(r"C:\Players\vlc.exe", url);

        assert_eq!(command.get_program(), r"C:\Players\vlc.exe");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec![std::ffi::OsStr::new(url)]);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let err = ProcessLauncher
            .launch("definitely-not-a-real-player-binary", "http://example.com/a.mp4")
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
