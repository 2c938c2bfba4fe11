//! Device location sensor abstraction.
//!
//! The host environment may or may not expose a positioning sensor.
//! Rather than a callback chain, the capability is modelled as one
//! blocking call bounded by a timeout; the resolver treats every error
//! variant the same way (fall through to the next tier).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A raw position report from the platform sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
}

/// Why a sensor read produced no fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// No fix within the allowed wait.
    Timeout,
    /// The user or platform refused access.
    Denied,
    /// The host has no positioning capability.
    Unavailable,
    /// Hardware or driver fault.
    Failed(String),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for a fix"),
            Self::Denied => write!(f, "permission denied"),
            Self::Unavailable => write!(f, "no sensor available"),
            Self::Failed(msg) => write!(f, "sensor failure: {}", msg),
        }
    }
}

impl std::error::Error for SensorError {}

/// Host positioning capability.
///
/// Implementations must return within roughly `timeout`; the resolver
/// will not wait longer before moving to the network tier.
pub trait DeviceSensor: Send + Sync {
    fn current_position(&self, timeout: Duration, high_accuracy: bool) -> Result<SensorFix, SensorError>;
}

/// Default sensor for hosts without positioning hardware (servers, CI).
pub struct NoSensor;

impl DeviceSensor for NoSensor {
    fn current_position(&self, _timeout: Duration, _high_accuracy: bool) -> Result<SensorFix, SensorError> {
        Err(SensorError::Unavailable)
    }
}
