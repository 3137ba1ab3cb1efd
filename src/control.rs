//! Temperature control loop.
//!
//! A single perpetual task that runs a one-shot actuator self-test and then
//! once per tick maps the temperature difference onto heater-bank and fan
//! commands. Device writes are best-effort: the in-memory actuator state
//! commits even when the hardware is unavailable.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tokio_stream::{StreamExt, wrappers::IntervalStream};

use crate::actuator::ActuatorPort;
use crate::state::ControllerState;

/// Degrees of heating deficit that fire one more lamp.
pub const LAMP_STEP: f32 = 3.0;
/// Degrees of cooling excess per fan increment.
pub const FAN_STEP: f32 = 0.5;
/// Duty points added per cooling step.
pub const FAN_INCREMENT: i32 = 10;
/// Lowest duty the fan is commanded to once spinning.
pub const FAN_MIN: u8 = 25;
/// Full fan duty.
pub const FAN_MAX: u8 = 100;
/// Number of heating elements in the bank.
pub const LAMPS_MAX: u8 = 3;

/// Lamp count for a positive difference (box must get hotter).
pub fn lamps_for_deficit(diff: f32) -> u8 {
    let count = (diff / LAMP_STEP).floor() as i32 + 1;
    count.min(i32::from(LAMPS_MAX)) as u8
}

/// Fan duty for a negative difference (box must get cooler).
pub fn fan_for_excess(diff: f32) -> u8 {
    let duty = -((diff / FAN_STEP).floor() as i32 + 1) * FAN_INCREMENT;
    duty.clamp(i32::from(FAN_MIN), i32::from(FAN_MAX)) as u8
}

/// The perpetual regulation task.
///
/// Owns the two actuator ports; shares [`ControllerState`] with the
/// connection handlers. Never terminates except with the process.
pub struct ControlLoop {
    state: Arc<ControllerState>,
    heater: Box<dyn ActuatorPort>,
    fan: Box<dyn ActuatorPort>,
    tick: Duration,
}

impl ControlLoop {
    pub fn new(
        state: Arc<ControllerState>,
        heater: Box<dyn ActuatorPort>,
        fan: Box<dyn ActuatorPort>,
        tick: Duration,
    ) -> Self {
        Self {
            state,
            heater,
            fan,
            tick,
        }
    }

    /// Spawns the loop as a detached background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        self.self_test().await;
        info!("control loop entering steady state");

        let mut ticks = IntervalStream::new(interval(self.tick));
        while ticks.next().await.is_some() {
            self.step().await;
        }
    }

    /// One-shot diagnostic warm-up: cycle the lamps, sweep the fan up to
    /// full duty and back down to its floor.
    async fn self_test(&self) {
        for count in 0..=LAMPS_MAX {
            self.set_lamps(count).await;
            sleep(Duration::from_secs(1)).await;
        }
        self.set_lamps(0).await;

        for _ in 0..5 {
            let duty = self.state.actuators().await.fan;
            self.set_fan(duty + 20).await;
        }
        for _ in 0..3 {
            let duty = self.state.actuators().await.fan;
            self.set_fan(duty - 20).await;
        }
        self.set_fan(FAN_MIN).await;
    }

    async fn step(&self) {
        let diff = self.state.diff().await;

        if diff > 0.0 {
            self.set_fan(FAN_MIN).await;
            self.set_lamps(lamps_for_deficit(diff)).await;
        } else if diff < 0.0 {
            self.set_lamps(0).await;
            self.set_fan(fan_for_excess(diff)).await;
        }
        // diff == 0: both actuators hold their last commanded values.
    }

    /// Commits the lamp count and pushes it to the heater bank while still
    /// holding the Actuators lock, so concurrent commands cannot race on
    /// the device.
    async fn set_lamps(&self, count: u8) {
        let mut actuators = self.state.actuators().await;
        actuators.lamps = count;
        if let Err(e) = self.heater.write(count).await {
            debug!("heater bank unavailable: {e:#}");
        }
    }

    async fn set_fan(&self, duty: u8) {
        let mut actuators = self.state.actuators().await;
        actuators.fan = duty;
        if let Err(e) = self.fan.write(duty).await {
            debug!("fan unavailable: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records every commanded value, in order.
    #[derive(Debug, Default, Clone)]
    struct RecordingPort {
        writes: Arc<Mutex<Vec<u8>>>,
    }

    impl RecordingPort {
        fn writes(&self) -> Vec<u8> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActuatorPort for RecordingPort {
        async fn write(&self, value: u8) -> Result<()> {
            self.writes.lock().unwrap().push(value);
            Ok(())
        }
    }

    /// Always reports the device as unavailable.
    #[derive(Debug)]
    struct FailingPort;

    #[async_trait]
    impl ActuatorPort for FailingPort {
        async fn write(&self, _value: u8) -> Result<()> {
            Err(anyhow!("device unavailable"))
        }
    }

    fn control_loop_with_ports(
        state: Arc<ControllerState>,
    ) -> (ControlLoop, RecordingPort, RecordingPort) {
        let heater = RecordingPort::default();
        let fan = RecordingPort::default();
        let control = ControlLoop::new(
            state,
            Box::new(heater.clone()),
            Box::new(fan.clone()),
            Duration::from_secs(1),
        );
        (control, heater, fan)
    }

    #[test]
    fn lamps_scale_with_deficit() {
        assert_eq!(lamps_for_deficit(0.5), 1);
        assert_eq!(lamps_for_deficit(3.0), 2);
        assert_eq!(lamps_for_deficit(5.9), 2);
        assert_eq!(lamps_for_deficit(6.0), 3);
    }

    #[test]
    fn lamps_clamp_at_bank_size() {
        assert_eq!(lamps_for_deficit(9.0), 3);
        assert_eq!(lamps_for_deficit(100.0), 3);
    }

    #[test]
    fn fan_duty_scales_with_excess() {
        assert_eq!(fan_for_excess(-2.0), 30);
        assert_eq!(fan_for_excess(-3.0), 50);
    }

    #[test]
    fn fan_duty_clamps_to_floor() {
        // -0.4 degrees computes duty 0 before clamping.
        assert_eq!(fan_for_excess(-0.4), 25);
        assert_eq!(fan_for_excess(-0.6), 25);
    }

    #[test]
    fn fan_duty_clamps_to_full() {
        // -6.0 degrees computes duty 110 before clamping.
        assert_eq!(fan_for_excess(-6.0), 100);
        assert_eq!(fan_for_excess(-50.0), 100);
    }

    #[tokio::test]
    async fn step_heats_when_target_above_current() {
        let state = Arc::new(ControllerState::new());
        state.set_current(20.0).await;
        state.set_target(24.0).await;

        let (control, heater, fan) = control_loop_with_ports(Arc::clone(&state));
        control.step().await;

        assert_eq!(heater.writes(), vec![2]);
        assert_eq!(fan.writes(), vec![FAN_MIN]);

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.lamps, 2);
        assert_eq!(snapshot.fan, FAN_MIN);
    }

    #[tokio::test]
    async fn step_cools_when_target_below_current() {
        let state = Arc::new(ControllerState::new());
        state.set_current(26.0).await;
        state.set_target(24.0).await;

        let (control, heater, fan) = control_loop_with_ports(Arc::clone(&state));
        control.step().await;

        assert_eq!(heater.writes(), vec![0]);
        assert_eq!(fan.writes(), vec![30]);
    }

    #[tokio::test]
    async fn step_holds_actuators_on_zero_difference() {
        let state = Arc::new(ControllerState::new());
        state.set_current(24.0).await;
        state.set_target(24.0).await;

        let (control, heater, fan) = control_loop_with_ports(Arc::clone(&state));
        control.step().await;

        assert!(heater.writes().is_empty());
        assert!(fan.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_device_write_still_commits_state() {
        let state = Arc::new(ControllerState::new());
        state.set_current(20.0).await;
        state.set_target(30.0).await;

        let control = ControlLoop::new(
            Arc::clone(&state),
            Box::new(FailingPort),
            Box::new(FailingPort),
            Duration::from_secs(1),
        );
        control.step().await;

        // In-memory state reflects the intended command even though the
        // hardware never saw it.
        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.lamps, 3);
        assert_eq!(snapshot.fan, FAN_MIN);
    }

    #[tokio::test(start_paused = true)]
    async fn self_test_cycles_lamps_and_sweeps_fan() {
        let state = Arc::new(ControllerState::new());
        let (control, heater, fan) = control_loop_with_ports(Arc::clone(&state));

        control.self_test().await;

        assert_eq!(heater.writes(), vec![0, 1, 2, 3, 0]);
        assert_eq!(fan.writes(), vec![20, 40, 60, 80, 100, 80, 60, 40, 25]);

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.lamps, 0);
        assert_eq!(snapshot.fan, FAN_MIN);
    }
}
