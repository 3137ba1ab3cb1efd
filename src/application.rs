//! Application wiring and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::net::TcpListener;

use crate::{
    actuator::CharDevice, config::Config, control::ControlLoop, error::StartupError, server,
    state::ControllerState,
};

/// The controller process: shared state, the control loop, and the
/// listener, wired together from configuration.
///
/// # Example
///
/// ```no_run
/// use thermoboxd::{application::Application, config::Config};
///
/// # async fn example() -> Result<(), thermoboxd::error::StartupError> {
/// Application::builder()
///     .with_config(Config::default())
///     .with_port(5000)
///     .build()?
///     .run()
///     .await
/// # }
/// ```
pub struct Application {
    config: Config,
    port: u16,
}

impl Application {
    /// Creates a new ApplicationBuilder for constructing Application
    /// instances.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Binds the listener, starts the control loop, and serves forever.
    ///
    /// Only startup can fail; once the readiness line is printed this
    /// future never resolves.
    pub async fn run(self) -> Result<(), StartupError> {
        let addr = SocketAddr::new(self.config.listen_addr, self.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind { addr, source })?;

        info!("listening on {addr}");
        println!("CONTROLLER is ready and listening on port {} ..", self.port);

        let state = Arc::new(ControllerState::new());
        ControlLoop::new(
            Arc::clone(&state),
            Box::new(CharDevice::new(&self.config.heater_device)),
            Box::new(CharDevice::new(&self.config.fan_device)),
            Duration::from_secs(u64::from(self.config.tick_seconds)),
        )
        .spawn();

        server::serve(listener, state).await;
        Ok(())
    }
}

/// Builder pattern for creating Application instances.
pub struct ApplicationBuilder {
    config: Config,
    port: Option<u16>,
}

impl ApplicationBuilder {
    fn new() -> Self {
        Self {
            config: Config::default(),
            port: None,
        }
    }

    /// Sets the configuration for the application.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the TCP port the listener binds.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builds the Application instance.
    pub fn build(self) -> Result<Application, StartupError> {
        let port = self
            .port
            .ok_or_else(|| StartupError::Config(anyhow::anyhow!("listen port is required")))?;

        Ok(Application {
            config: self.config,
            port,
        })
    }
}
