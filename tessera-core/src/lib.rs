//! Board-agnostic control logic for the Tessera fabrication firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Domain traits (temperature sensing, probing, heater channels)
//! - Heat management (PID control loop and fault supervision)
//! - Bed leveling (grid distortion model and plane-fit methods)
//! - Tool table
//! - Configuration type definitions and startup validation
//! - Machine context driven by the timer tick and command contexts
//! - Persistence snapshots (postcard + CRC)

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod heat;
pub mod leveling;
pub mod machine;
pub mod motion;
pub mod persist;
pub mod status;
pub mod tool;
pub mod traits;

pub(crate) mod float;
