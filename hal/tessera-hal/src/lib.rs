//! Tessera Hardware Capability Layer
//!
//! This crate defines the minimal operation contracts that concrete pin
//! implementations satisfy. Generic control code (PID loops, stepping
//! logic, leveling) is written once against these traits and specialized
//! at compile time for the device wiring selected at configuration time;
//! there is no runtime pin-to-behavior dispatch on the hot path.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Control logic (tessera-core)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tessera-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Capability implementations             │
//! │  (tessera-io, chip HAL adapters)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`adc::AnalogChannel`] - Raw analog reads for temperature sensing
//! - [`pwm::PwmChannel`], [`pwm::PwmOutput`] - Duty-cycle outputs
//! - [`flash::KvStore`] - Persistent key-value storage
//!
//! Every capability instance is single-owner and bound to exactly one
//! physical pin; instances are created once at startup and live for the
//! process lifetime.

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod gpio;
pub mod pwm;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogChannel};
pub use flash::{FlashError, KvStore, StorageKey};
pub use gpio::{InputPin, Inverted, OutputPin};
pub use pwm::{PwmChannel, PwmOutput};
