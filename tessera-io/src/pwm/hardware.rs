//! Hardware-backed PWM

use tessera_hal::{PwmChannel, PwmOutput};

/// PWM delegated to a peripheral compare channel
///
/// The tick hook stays the trait's no-op default, so channels wrapped in
/// this strategy cost nothing in the timer interrupt.
pub struct HardwarePwm<C> {
    channel: C,
    duty: u8,
}

impl<C: PwmChannel> HardwarePwm<C> {
    /// Wrap a channel, programming its carrier frequency and duty zero
    pub fn new(mut channel: C, frequency_hz: u32) -> Self {
        channel.set_frequency_hz(frequency_hz);
        channel.set_duty_u8(0);
        Self { channel, duty: 0 }
    }
}

impl<C: PwmChannel> PwmOutput for HardwarePwm<C> {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        self.channel.set_duty_u8(duty);
    }

    fn duty(&self) -> u8 {
        self.duty
    }
}
