//! Kickstart wrapper

use tessera_hal::PwmOutput;

/// Full-power starting burst for sluggish loads
///
/// Fans and similar loads stall at low duty from standstill. When the
/// duty goes from zero to a value below the threshold, the wrapped
/// output is driven at full power for a fixed number of ticks before
/// settling to the requested duty. `duty()` always reports the request,
/// never the burst, so control loops read back what they wrote.
pub struct Kickstart<O> {
    inner: O,
    requested: u8,
    threshold: u8,
    kick_ticks: u16,
    remaining: u16,
}

impl<O: PwmOutput> Kickstart<O> {
    /// Wrap an output; requests below `threshold` from standstill get a
    /// `kick_ticks`-long full-power burst
    pub fn new(inner: O, threshold: u8, kick_ticks: u16) -> Self {
        Self {
            inner,
            requested: 0,
            threshold,
            kick_ticks,
            remaining: 0,
        }
    }
}

impl<O: PwmOutput> PwmOutput for Kickstart<O> {
    fn set_duty(&mut self, duty: u8) {
        let from_standstill = self.requested == 0;
        if duty == 0 {
            self.remaining = 0;
            self.inner.set_duty(0);
        } else if from_standstill && duty < self.threshold && self.kick_ticks > 0 {
            self.remaining = self.kick_ticks;
            self.inner.set_duty(255);
        } else if self.remaining == 0 {
            self.inner.set_duty(duty);
        }
        // A nonzero change mid-burst just retargets what we settle to
        self.requested = duty;
    }

    fn duty(&self) -> u8 {
        self.requested
    }

    fn on_pwm_tick(&mut self) {
        self.inner.on_pwm_tick();
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.inner.set_duty(self.requested);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        duty: u8,
        ticks_at_full: u16,
    }

    impl PwmOutput for Recorder {
        fn set_duty(&mut self, duty: u8) {
            self.duty = duty;
        }

        fn duty(&self) -> u8 {
            self.duty
        }

        fn on_pwm_tick(&mut self) {
            if self.duty == 255 {
                self.ticks_at_full += 1;
            }
        }
    }

    #[test]
    fn test_burst_lasts_exactly_the_configured_ticks() {
        let mut pwm = Kickstart::new(Recorder::default(), 100, 50);
        pwm.set_duty(40);
        assert_eq!(pwm.inner.duty, 255);
        assert_eq!(pwm.duty(), 40);

        for _ in 0..200 {
            pwm.on_pwm_tick();
        }
        assert_eq!(pwm.inner.ticks_at_full, 50);
        assert_eq!(pwm.inner.duty, 40);
    }

    #[test]
    fn test_no_burst_above_threshold() {
        let mut pwm = Kickstart::new(Recorder::default(), 100, 50);
        pwm.set_duty(150);
        assert_eq!(pwm.inner.duty, 150);
    }

    #[test]
    fn test_no_burst_when_already_running() {
        let mut pwm = Kickstart::new(Recorder::default(), 100, 50);
        pwm.set_duty(150);
        for _ in 0..10 {
            pwm.on_pwm_tick();
        }
        pwm.set_duty(40);
        assert_eq!(pwm.inner.duty, 40);
    }

    #[test]
    fn test_zero_cancels_burst() {
        let mut pwm = Kickstart::new(Recorder::default(), 100, 50);
        pwm.set_duty(40);
        pwm.on_pwm_tick();
        pwm.set_duty(0);
        assert_eq!(pwm.inner.duty, 0);
        for _ in 0..100 {
            pwm.on_pwm_tick();
        }
        assert_eq!(pwm.inner.duty, 0);
    }

    #[test]
    fn test_retarget_during_burst_settles_to_new_duty() {
        let mut pwm = Kickstart::new(Recorder::default(), 100, 50);
        pwm.set_duty(40);
        for _ in 0..10 {
            pwm.on_pwm_tick();
        }
        pwm.set_duty(60);
        assert_eq!(pwm.inner.duty, 255);
        for _ in 0..40 {
            pwm.on_pwm_tick();
        }
        assert_eq!(pwm.inner.duty, 60);
    }
}
