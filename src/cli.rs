use clap::Parser;
use std::path::PathBuf;

/// thermoboxd — networked box-temperature controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TCP port to listen on
    pub port: u16,

    /// YAML config file path (default: standard locations)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Detach from the terminal and log to syslog only
    #[arg(short = 'd', long = "daemonize", default_value = "false")]
    pub daemonize: bool,
}
