// argus_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong while configuring or running a sensor.
///
/// Spatial queries themselves never fail: "no hit" and "no overlap" are
/// ordinary results, so they have no variant here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("invalid {sensor} sensor configuration: {reason}")]
    InvalidConfig {
        sensor: &'static str,
        reason: String,
    },

    /// The pixel sensor has no camera attached. Sticky until a camera is attached.
    #[error("no camera is attached to the pixel sensor")]
    MissingCamera,

    #[error("render target returned {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("frame store failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, SensorError>;

impl SensorError {
    pub(crate) fn invalid(sensor: &'static str, reason: impl Into<String>) -> Self {
        SensorError::InvalidConfig {
            sensor,
            reason: reason.into(),
        }
    }
}
