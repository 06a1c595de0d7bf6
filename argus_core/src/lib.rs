// argus_core/src/lib.rs

//! Pure sampling and encoding logic for agent perception sensors.
//!
//! The crate knows nothing about a host engine. Physics casts, overlap
//! queries and rendering are reached through the traits in [`abstractions`],
//! and every sensor turns the answers into a flat `f32` observation vector
//! whose length is a deterministic function of its configuration.

pub mod abstractions;
pub mod encoding;
pub mod error;
pub mod prelude;
pub mod sensors;
pub mod snapshot;
pub mod tags;
pub mod types;
pub mod utils;
