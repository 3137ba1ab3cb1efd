//! Shared controller state and its locking discipline.
//!
//! Runtime state is split into two independently locked groups so that a
//! slow actuator write never stalls a peer updating the temperature. The
//! container is created once at startup and handed out as an `Arc` to every
//! connection handler and to the control loop.
//!
//! Lock order invariant: when both groups are needed, Temperature is
//! acquired before Actuators. [`ControllerState::snapshot`] is the only
//! function that takes both locks; keep it that way.

use tokio::sync::{Mutex, MutexGuard};

/// Temperature group: setpoint and latest sensor reading, degrees Celsius.
///
/// Values written by peers are stored as-is; no bound checking is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Temperature {
    pub target: f32,
    pub current: f32,
}

/// Actuator group: last committed heater-bank stage count and fan duty.
///
/// Only the control loop writes this group, so the ranges it enforces
/// (lamps 0..=3, fan 25..=100 once spinning) hold for everything readers
/// observe here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actuators {
    pub lamps: u8,
    pub fan: u8,
}

/// Consistent view of both groups, produced only by
/// [`ControllerState::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub target: f32,
    pub current: f32,
    pub lamps: u8,
    pub fan: u8,
}

/// Process-wide controller state shared between connection handlers and the
/// control loop.
#[derive(Debug, Default)]
pub struct ControllerState {
    temperature: Mutex<Temperature>,
    actuators: Mutex<Actuators>,
}

impl ControllerState {
    /// Fresh state: both temperatures at 0.0, all actuators off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new target and returns `target - current`, both inside the
    /// same critical section so the reported difference is never computed
    /// against a half-updated pair.
    pub async fn set_target(&self, target: f32) -> f32 {
        let mut temperature = self.temperature.lock().await;
        temperature.target = target;
        temperature.target - temperature.current
    }

    /// Stores the latest sensor reading.
    pub async fn set_current(&self, current: f32) {
        self.temperature.lock().await.current = current;
    }

    /// `target - current` under the Temperature lock.
    pub async fn diff(&self) -> f32 {
        let temperature = self.temperature.lock().await;
        temperature.target - temperature.current
    }

    /// Locks the actuator group for a commit-and-write sequence.
    ///
    /// Callers must not touch the Temperature lock while holding this
    /// guard; see the module-level lock order invariant.
    pub async fn actuators(&self) -> MutexGuard<'_, Actuators> {
        self.actuators.lock().await
    }

    /// Atomic view of both groups for the `LOG` query.
    ///
    /// This is the single place both locks are held, in the fixed
    /// Temperature-then-Actuators order.
    pub async fn snapshot(&self) -> Snapshot {
        let temperature = self.temperature.lock().await;
        let actuators = self.actuators.lock().await;
        Snapshot {
            target: temperature.target,
            current: temperature.current,
            lamps: actuators.lamps,
            fan: actuators.fan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn fresh_state_is_all_zero() {
        let state = ControllerState::new();
        let snapshot = state.snapshot().await;
        assert_eq!(
            snapshot,
            Snapshot {
                target: 0.0,
                current: 0.0,
                lamps: 0,
                fan: 0,
            }
        );
    }

    #[tokio::test]
    async fn set_target_returns_difference_to_current() {
        let state = ControllerState::new();
        state.set_current(24.6).await;

        let diff = state.set_target(30.0).await;
        assert!((diff - 5.4).abs() < 1e-5);

        let diff = state.set_target(20.0).await;
        assert!((diff + 4.6).abs() < 1e-5);
    }

    #[tokio::test]
    async fn set_target_is_idempotent() {
        let state = ControllerState::new();
        let first = state.set_target(22.5).await;
        let second = state.set_target(22.5).await;

        assert_eq!(first, second);
        assert_eq!(state.snapshot().await.target, 22.5);
    }

    #[tokio::test]
    async fn snapshot_sees_actuator_commits() {
        let state = ControllerState::new();
        {
            let mut actuators = state.actuators().await;
            actuators.lamps = 2;
            actuators.fan = 40;
        }
        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.lamps, 2);
        assert_eq!(snapshot.fan, 40);
    }

    #[tokio::test]
    async fn concurrent_writers_never_tear_a_field() {
        let state = Arc::new(ControllerState::new());
        let sent: Vec<f32> = (0..100).map(|n| n as f32).collect();

        let mut handles = Vec::new();
        for value in sent.clone() {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                state.set_target(value).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let target = state.snapshot().await.target;
        assert!(sent.contains(&target), "final target {target} was never sent");
    }
}
