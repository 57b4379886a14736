//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vlc-mpc-helper - Open in VLC / MPC-HC helper
///
/// Local HTTP endpoint that launches browser media links in VLC or MPC-HC
#[derive(Parser, Debug)]
#[command(name = "vlc-mpc-helper")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbose output (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output to file
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Use this configuration file instead of the one in Documents
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the launch listener without tray or settings window
    #[default]
    Serve,

    /// Print detected VLC and MPC-HC executable paths
    Detect,

    /// Print the configuration file location and its values
    Config,
}

impl Args {
    /// Get the log level based on verbose/quiet flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else {
            match self.verbose {
                0 => tracing::Level::INFO,
                1 => tracing::Level::DEBUG,
                _ => tracing::Level::TRACE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let args = Args::parse_from(["vlc-mpc-helper"]);
        assert_eq!(args.log_level(), tracing::Level::INFO);
        assert_eq!(args.command.unwrap_or_default(), Command::Serve);
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from(["vlc-mpc-helper", "detect", "-vv", "--config", "c.json"]);
        assert_eq!(args.command, Some(Command::Detect));
        assert_eq!(args.log_level(), tracing::Level::TRACE);
        assert_eq!(args.config, Some(PathBuf::from("c.json")));

        let args = Args::parse_from(["vlc-mpc-helper", "-q"]);
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
