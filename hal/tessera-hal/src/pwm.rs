//! PWM output abstractions
//!
//! Two contracts live here. [`PwmChannel`] is the raw hardware channel a
//! chip HAL provides. [`PwmOutput`] is what control code consumes: a duty
//! cycle in `[0, 255]` plus a tick hook so software-timed strategies can
//! schedule their edges from the shared timer interrupt. Hardware-backed
//! strategies leave the hook as a no-op, so specialization removes it
//! entirely from their hot path.

/// Hardware PWM channel
///
/// Implementations map the duty range `[0, 255]` onto whatever compare
/// register the peripheral uses.
pub trait PwmChannel {
    /// Set the duty cycle (0 = always off, 255 = always on)
    fn set_duty_u8(&mut self, duty: u8);

    /// Set the output frequency in Hz
    fn set_frequency_hz(&mut self, hz: u32);
}

/// Duty-cycle output consumed by control loops
///
/// The invariant maintained by every implementation: the effective duty is
/// always within `[0, 255]`, and `duty()` reports the most recently
/// requested value.
pub trait PwmOutput {
    /// Request a duty cycle (0 = off, 255 = full on)
    fn set_duty(&mut self, duty: u8);

    /// The most recently requested duty cycle
    fn duty(&self) -> u8;

    /// Advance one step of the shared PWM time base
    ///
    /// Called from the periodic timer interrupt. Software strategies toggle
    /// their output pin here; this path must stay constant-time because a
    /// late edge directly skews the delivered duty.
    fn on_pwm_tick(&mut self) {}
}
