//! # thermoboxd
//!
//! A networked environmental-control daemon: one controller process keeps a
//! closed box at a target temperature by driving a multi-stage heater bank
//! and a variable-speed fan from periodic sensor readings.
//!
//! ## Features
//!
//! - **Async Architecture**: Built on Tokio; one task per connection plus a
//!   perpetual control-loop task
//! - **Tiny Text Protocol**: `SET`/`TEMP`/`LOG` over plain TCP, one
//!   request/reply exchange per connection
//! - **Split Locking**: temperature and actuator state live behind
//!   independent locks with a fixed acquisition order
//! - **Best-Effort Actuation**: device writes never fail the controller;
//!   in-memory state always reflects the intended command
//!
//! ## Architecture
//!
//! - [`ControllerState`](state::ControllerState) - shared runtime state
//! - [`ControlLoop`](control::ControlLoop) - self-test ritual plus the
//!   once-per-second regulation tick
//! - [`serve`](server::serve) - accept loop spawning one handler per peer
//! - [`ActuatorPort`](actuator::ActuatorPort) - seam to the write-only
//!   heater and fan devices
//!
//! ## Example
//!
//! ```no_run
//! use thermoboxd::{application::Application, config::Config};
//!
//! # async fn example() -> Result<(), thermoboxd::error::StartupError> {
//! let config = Config::load(None).map_err(thermoboxd::error::StartupError::Config)?;
//! Application::builder()
//!     .with_config(config)
//!     .with_port(5000)
//!     .build()?
//!     .run()
//!     .await
//! # }
//! ```

pub mod actuator;
pub mod application;
pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod protocol;
pub mod server;
pub mod state;
