//! Actuator device abstraction.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Write-only integer-valued device driven by the control loop.
///
/// The heater bank takes a stage count 0..=3, the fan a duty percentage;
/// neither device reports state back.
#[async_trait]
pub trait ActuatorPort: Send + Sync + fmt::Debug {
    /// Commands the device to the given value.
    async fn write(&self, value: u8) -> Result<()>;
}

/// Character-device actuator.
///
/// Each command opens the node, writes the decimal value, and closes it
/// again, matching how the kernel drivers behind `/dev/microwave` and
/// `/dev/eprofan` consume input.
#[derive(Debug, Clone)]
pub struct CharDevice {
    path: PathBuf,
}

impl CharDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActuatorPort for CharDevice {
    async fn write(&self, value: u8) -> Result<()> {
        tokio::fs::write(&self.path, value.to_string())
            .await
            .with_context(|| format!("writing {value} to {}", self.path.display()))
    }
}
