//! PWM output strategies
//!
//! Three implementations of the [`PwmOutput`](tessera_hal::PwmOutput)
//! contract. Software PWM times its edges from the shared tick; hardware
//! PWM forwards to a peripheral channel and ignores the tick; the
//! kickstart wrapper composes over either to give sluggish loads a
//! full-power starting burst.

mod hardware;
mod kickstart;
mod software;

pub use hardware::HardwarePwm;
pub use kickstart::Kickstart;
pub use software::SoftwarePwm;
