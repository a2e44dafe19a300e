//! Closed-loop heat management
//!
//! One [`HeatManager`] per physical heater. Each owns its sensor, its PWM
//! output, a PID loop, and two independent fault supervisors (sensor
//! plausibility, thermal decoupling). Fault handling always drops the
//! duty to zero before the fault becomes visible to any reader.

mod manager;
mod pid;

pub use manager::HeatManager;
pub use pid::{GainsSnapshot, PidController, PidGains};
