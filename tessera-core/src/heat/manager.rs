//! Heat manager
//!
//! Owns one sensor/output pair and runs the full per-tick pipeline:
//! read, plausibility check, PID, decouple supervision, duty write,
//! status publish. Fault entry always writes duty zero to the actuator
//! before the fault state is stored, so no observer can ever see a
//! faulted heater that is still powered.

use tessera_hal::{FlashError, KvStore, PwmOutput, StorageKey};

use crate::config::HeaterConfig;
use crate::persist::{load_snapshot, save_snapshot};
use crate::status::HeaterStatusCell;
use crate::traits::{HeaterChannel, HeaterState, TemperatureSensor};

use super::pid::{GainsSnapshot, PidController, PidGains};

/// Closed-loop controller for one heater
pub struct HeatManager<S, O> {
    sensor: S,
    output: O,
    pid: PidController,
    config: HeaterConfig,
    index: u8,
    target: f32,
    current: f32,
    state: HeaterState,
    status: HeaterStatusCell,
    last_tick_ms: Option<u32>,
    decouple_ref_temp: f32,
    decouple_ref_ms: u32,
}

impl<S: TemperatureSensor, O: PwmOutput> HeatManager<S, O> {
    pub fn new(index: u8, config: HeaterConfig, sensor: S, output: O) -> Self {
        Self {
            sensor,
            output,
            pid: PidController::new(config.gains, config.drive_min, config.drive_max),
            config,
            index,
            target: 0.0,
            current: 0.0,
            state: HeaterState::Idle,
            status: HeaterStatusCell::new(),
            last_tick_ms: None,
            decouple_ref_temp: 0.0,
            decouple_ref_ms: 0,
        }
    }

    /// Lock-free status snapshot for the command context
    pub fn status(&self) -> &HeaterStatusCell {
        &self.status
    }

    /// Current PID gains
    pub fn gains(&self) -> PidGains {
        self.pid.gains()
    }

    /// Replace the PID gains (after autotune or an operator command)
    pub fn set_gains(&mut self, gains: PidGains) {
        self.pid.set_gains(gains);
    }

    /// Persist the current gains
    pub fn save_gains<K: KvStore>(&self, store: &mut K) -> Result<(), FlashError> {
        let mut buf = [0u8; 64];
        let mut snap = GainsSnapshot::new(self.index, self.pid.gains());
        save_snapshot(store, StorageKey::HeaterGains, &mut snap, &mut buf)
    }

    /// Restore persisted gains; a missing key or a snapshot belonging to
    /// another heater leaves the configured defaults in place
    pub fn load_gains<K: KvStore>(&mut self, store: &mut K) -> Result<(), FlashError> {
        let mut buf = [0u8; 64];
        match load_snapshot::<GainsSnapshot, _>(store, StorageKey::HeaterGains, &mut buf) {
            Ok(snap) if snap.heater == self.index => {
                self.pid.set_gains(snap.gains);
                Ok(())
            }
            Ok(_) | Err(FlashError::NotFound) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Enter a terminal fault: actuator off first, then the state change
    fn fail(&mut self, fault: HeaterState) {
        self.output.set_duty(0);
        self.state = fault;
        self.publish(0);
    }

    fn arm_decouple(&mut self, now_ms: u32) {
        self.decouple_ref_temp = self.current;
        self.decouple_ref_ms = now_ms;
    }

    fn publish(&self, duty: u8) {
        self.status.publish(self.state, self.current, self.target, duty);
    }
}

impl<S: TemperatureSensor, O: PwmOutput> HeaterChannel for HeatManager<S, O> {
    fn control_tick(&mut self, now_ms: u32) {
        if self.state.is_fault() {
            self.output.set_duty(0);
            self.publish(0);
            return;
        }

        match self.sensor.read_celsius() {
            Ok(t) if t <= self.config.max_temp => self.current = t,
            Ok(t) => {
                self.current = t;
                self.fail(HeaterState::SensorFault);
                return;
            }
            Err(_) => {
                self.fail(HeaterState::SensorFault);
                return;
            }
        }

        if self.target <= 0.0 {
            self.state = HeaterState::Idle;
            self.pid.reset();
            self.last_tick_ms = Some(now_ms);
            self.output.set_duty(0);
            self.publish(0);
            return;
        }

        let dt_s = match self.last_tick_ms {
            Some(last) => now_ms.wrapping_sub(last) as f32 / 1000.0,
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        // Asymmetric hysteresis: enter the band at tolerance, leave it
        // only past twice the tolerance, so boundary noise cannot flap
        // the state
        let error = self.target - self.current;
        if self.state == HeaterState::Idle {
            self.state = HeaterState::Heating;
            self.arm_decouple(now_ms);
        }
        match self.state {
            HeaterState::Heating if self.current >= self.target - self.config.tolerance => {
                self.state = HeaterState::AtTarget;
            }
            HeaterState::AtTarget if error > 2.0 * self.config.tolerance => {
                self.state = HeaterState::Heating;
                self.arm_decouple(now_ms);
            }
            _ => {}
        }

        let duty = self
            .pid
            .update(self.target, self.current, dt_s)
            .min(self.config.max_pwm);

        // Decouple supervision: while driving hard during the ramp, the
        // temperature must keep rising at least a degree per window
        if self.state == HeaterState::Heating && duty >= self.config.min_duty {
            if self.current >= self.decouple_ref_temp + 1.0 {
                self.arm_decouple(now_ms);
            } else if now_ms.wrapping_sub(self.decouple_ref_ms) > self.config.decouple_timeout_ms {
                self.fail(HeaterState::DecoupledFault);
                return;
            }
        } else {
            self.arm_decouple(now_ms);
        }

        self.output.set_duty(duty);
        self.publish(duty);
    }

    fn pwm_tick(&mut self) {
        self.output.on_pwm_tick();
    }

    fn set_target(&mut self, celsius: f32) {
        if celsius > self.config.max_temp {
            self.target = 0.0;
            self.fail(HeaterState::SensorFault);
            return;
        }
        self.target = if celsius > 0.0 { celsius } else { 0.0 };
    }

    fn target(&self) -> f32 {
        self.target
    }

    fn state(&self) -> HeaterState {
        self.state
    }

    fn current_temperature(&self) -> f32 {
        self.current
    }

    fn duty(&self) -> u8 {
        self.output.duty()
    }

    fn reset_fault(&mut self) {
        if !self.state.is_fault() {
            return;
        }
        self.target = 0.0;
        self.state = HeaterState::Idle;
        self.pid.reset();
        self.last_tick_ms = None;
        self.output.set_duty(0);
        self.publish(0);
    }

    fn is_at_operating_temperature(&self) -> bool {
        matches!(self.state, HeaterState::Heating | HeaterState::AtTarget)
            && self.target > 0.0
            && self.current >= self.target - self.config.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SensorError;

    struct MockSensor {
        temp: f32,
        error: Option<SensorError>,
    }

    impl MockSensor {
        fn at(temp: f32) -> Self {
            Self { temp, error: None }
        }
    }

    impl TemperatureSensor for MockSensor {
        fn read_celsius(&mut self) -> Result<f32, SensorError> {
            match self.error {
                Some(err) => Err(err),
                None => Ok(self.temp),
            }
        }
    }

    #[derive(Default)]
    struct MockOutput {
        duty: u8,
        ticks: u32,
    }

    impl PwmOutput for MockOutput {
        fn set_duty(&mut self, duty: u8) {
            self.duty = duty;
        }

        fn duty(&self) -> u8 {
            self.duty
        }

        fn on_pwm_tick(&mut self) {
            self.ticks += 1;
        }
    }

    fn manager(temp: f32) -> HeatManager<MockSensor, MockOutput> {
        HeatManager::new(0, HeaterConfig::default(), MockSensor::at(temp), MockOutput::default())
    }

    const TICK_MS: u32 = 100;

    #[test]
    fn test_idle_without_target() {
        let mut heater = manager(22.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::Idle);
        assert_eq!(heater.duty(), 0);
        assert!(!heater.is_at_operating_temperature());
    }

    #[test]
    fn test_ramp_reaches_target() {
        let mut heater = manager(20.0);
        heater.set_target(200.0);

        // Crude first-order plant: gain on the duty, loss toward ambient
        let mut now = 0;
        for _ in 0..3000 {
            heater.control_tick(now);
            let drive = heater.duty() as f32 / 255.0;
            let temp = heater.sensor.temp;
            heater.sensor.temp = temp + (drive * 3.0 - (temp - 20.0) * 0.004);
            now += TICK_MS;
        }

        assert_eq!(heater.state(), HeaterState::AtTarget);
        assert!(heater.is_at_operating_temperature());
        assert!((heater.current_temperature() - 200.0).abs() < 5.0);
    }

    #[test]
    fn test_sensor_error_is_terminal_and_unpowered() {
        let mut heater = manager(20.0);
        heater.set_target(200.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::Heating);
        assert!(heater.duty() > 0);

        heater.sensor.error = Some(SensorError::OpenCircuit);
        heater.control_tick(TICK_MS);
        assert_eq!(heater.state(), HeaterState::SensorFault);
        assert_eq!(heater.output.duty, 0);
        assert_eq!(heater.status().duty(), 0);

        // Recovery of the reading does not clear the fault
        heater.sensor.error = None;
        heater.control_tick(2 * TICK_MS);
        assert_eq!(heater.state(), HeaterState::SensorFault);
        assert_eq!(heater.output.duty, 0);
    }

    #[test]
    fn test_implausibly_hot_reading_faults() {
        let mut heater = manager(20.0);
        heater.set_target(200.0);
        heater.control_tick(0);

        heater.sensor.temp = 300.0;
        heater.control_tick(TICK_MS);
        assert_eq!(heater.state(), HeaterState::SensorFault);
        assert_eq!(heater.output.duty, 0);
    }

    #[test]
    fn test_target_above_limit_faults_immediately() {
        let mut heater = manager(20.0);
        heater.set_target(400.0);
        assert_eq!(heater.state(), HeaterState::SensorFault);
        assert_eq!(heater.output.duty, 0);
        assert_eq!(heater.target(), 0.0);
    }

    #[test]
    fn test_decouple_fault_when_temperature_never_rises() {
        let mut heater = manager(20.0);
        heater.set_target(200.0);

        // Full drive, dead-flat reading: supervision must trip after the
        // configured window
        let mut now = 0;
        let timeout = heater.config.decouple_timeout_ms;
        while now <= timeout + 2 * TICK_MS {
            heater.control_tick(now);
            now += TICK_MS;
        }
        assert_eq!(heater.state(), HeaterState::DecoupledFault);
        assert_eq!(heater.output.duty, 0);
    }

    #[test]
    fn test_rising_temperature_keeps_decouple_happy() {
        let mut heater = manager(20.0);
        heater.set_target(200.0);

        let mut now = 0;
        for _ in 0..200 {
            heater.control_tick(now);
            heater.sensor.temp += 1.5;
            now += TICK_MS;
            if heater.sensor.temp > 195.0 {
                break;
            }
        }
        assert_eq!(heater.state(), HeaterState::Heating);
    }

    #[test]
    fn test_no_decouple_supervision_at_target() {
        let mut heater = manager(199.0);
        heater.set_target(200.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::AtTarget);

        // Hold a flat temperature far past the timeout
        let mut now = TICK_MS;
        while now < 10 * heater.config.decouple_timeout_ms {
            heater.control_tick(now);
            now += TICK_MS;
        }
        assert_eq!(heater.state(), HeaterState::AtTarget);
    }

    #[test]
    fn test_hysteresis_band() {
        let mut heater = manager(199.0);
        heater.set_target(200.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::AtTarget);

        // Dip inside twice the tolerance stays AtTarget
        heater.sensor.temp = 197.0;
        heater.control_tick(TICK_MS);
        assert_eq!(heater.state(), HeaterState::AtTarget);

        // Dip past twice the tolerance drops back to Heating
        heater.sensor.temp = 195.0;
        heater.control_tick(2 * TICK_MS);
        assert_eq!(heater.state(), HeaterState::Heating);
    }

    #[test]
    fn test_target_zero_returns_to_idle() {
        let mut heater = manager(150.0);
        heater.set_target(200.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::Heating);

        heater.set_target(0.0);
        heater.control_tick(TICK_MS);
        assert_eq!(heater.state(), HeaterState::Idle);
        assert_eq!(heater.duty(), 0);
    }

    #[test]
    fn test_reset_fault_requires_new_target() {
        let mut heater = manager(20.0);
        heater.set_target(400.0);
        assert!(heater.state().is_fault());

        heater.reset_fault();
        assert_eq!(heater.state(), HeaterState::Idle);
        assert_eq!(heater.target(), 0.0);
        assert_eq!(heater.duty(), 0);

        heater.set_target(200.0);
        heater.control_tick(0);
        assert_eq!(heater.state(), HeaterState::Heating);
    }

    #[test]
    fn test_reset_fault_noop_when_healthy() {
        let mut heater = manager(150.0);
        heater.set_target(200.0);
        heater.control_tick(0);
        heater.reset_fault();
        assert_eq!(heater.state(), HeaterState::Heating);
        assert_eq!(heater.target(), 200.0);
    }

    #[test]
    fn test_status_cell_mirrors_tick() {
        let mut heater = manager(150.0);
        heater.set_target(200.0);
        heater.control_tick(0);

        let status = heater.status();
        assert_eq!(status.state(), HeaterState::Heating);
        assert_eq!(status.temperature(), 150.0);
        assert_eq!(status.target(), 200.0);
        assert_eq!(status.duty(), heater.duty());
    }

    #[test]
    fn test_pwm_tick_forwards_to_output() {
        let mut heater = manager(20.0);
        heater.pwm_tick();
        heater.pwm_tick();
        assert_eq!(heater.output.ticks, 2);
    }

    #[test]
    fn test_gains_persist_round_trip() {
        use crate::persist::mock::MemStore;

        let mut store = MemStore::new();
        let mut heater = manager(20.0);
        let tuned = PidGains {
            kp: 31.0,
            ki: 1.3,
            kd: 80.0,
        };
        heater.set_gains(tuned);
        heater.save_gains(&mut store).unwrap();

        let mut rebooted = manager(20.0);
        rebooted.load_gains(&mut store).unwrap();
        assert_eq!(rebooted.gains(), tuned);
    }

    #[test]
    fn test_gains_for_other_heater_ignored() {
        use crate::persist::mock::MemStore;

        let mut store = MemStore::new();
        let mut other = HeatManager::new(
            1,
            HeaterConfig::default(),
            MockSensor::at(20.0),
            MockOutput::default(),
        );
        other.set_gains(PidGains {
            kp: 99.0,
            ki: 9.0,
            kd: 9.0,
        });
        other.save_gains(&mut store).unwrap();

        let mut heater = manager(20.0);
        heater.load_gains(&mut store).unwrap();
        assert_eq!(heater.gains(), PidGains::default());
    }
}
