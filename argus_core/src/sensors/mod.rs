// argus_core/src/sensors/mod.rs

pub mod grid;
pub mod pixel;
pub mod ray;

/// Shared range check for config validation.
pub(crate) fn require(
    sensor: &'static str,
    ok: bool,
    reason: impl FnOnce() -> String,
) -> crate::error::Result<()> {
    if ok {
        Ok(())
    } else {
        Err(crate::error::SensorError::invalid(sensor, reason()))
    }
}
