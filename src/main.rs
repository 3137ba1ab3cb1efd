use std::{fs::File, process};

use anyhow::{Result, anyhow};
use clap::Parser;
use daemonize::Daemonize;
use log::LevelFilter;
use syslog::{BasicLogger, Facility, Formatter3164};

use thermoboxd::{application::Application, cli::Cli, config::Config, error::StartupError};

fn init_log() -> Result<()> {
    syslog::unix(Formatter3164 {
        facility: Facility::LOG_DAEMON,
        hostname: None,
        process: "thermoboxd".into(),
        pid: 0,
    })
    .map_err(|e| anyhow!("{e}"))
    .and_then(|logger| {
        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map(|_| log::set_max_level(LevelFilter::Info))
            .map_err(|e| anyhow!("{e}"))
    })
}

fn into_daemon() -> Result<()> {
    File::create("/var/tmp/thermoboxd.log")
        .and_then(|out| Ok((out.try_clone()?, out)))
        .map_err(|e| anyhow!("{e}"))
        .and_then(|(stderr, stdout)| {
            Daemonize::new()
                .stdout(stdout)
                .stderr(stderr)
                .start()
                .map_err(|e| anyhow!("{e}"))
        })
}

fn run(cli: Cli) -> Result<(), StartupError> {
    init_log().map_err(StartupError::Logger)?;
    if cli.daemonize {
        into_daemon().map_err(StartupError::Daemonize)?;
    }

    let config = Config::load(cli.config).map_err(StartupError::Config)?;

    // The runtime is built after the daemonize fork so worker threads
    // belong to the detached process.
    let runtime = tokio::runtime::Runtime::new().map_err(StartupError::Runtime)?;
    runtime.block_on(
        Application::builder()
            .with_config(config)
            .with_port(cli.port)
            .build()?
            .run(),
    )
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("thermoboxd: error: {e}");
        process::exit(e.exit_code());
    }
}
