//! Capability driver implementations
//!
//! Concrete implementations of the contracts defined in tessera-hal and
//! tessera-core, generic over raw pins and channels:
//!
//! - PWM strategies (software-timed, hardware-backed, kickstart wrapper)
//! - Temperature sensors (ADC + conversion-table thermistor)
//! - Endstops
//! - Stepper channel with endstop gating

#![no_std]
#![deny(unsafe_code)]

pub mod endstop;
pub mod pwm;
pub mod sensor;
pub mod stepper;
