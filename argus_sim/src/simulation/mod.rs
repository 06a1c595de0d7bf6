// argus_sim/src/simulation/mod.rs

pub mod config;
pub mod debugging;
pub mod render;
pub mod runner;
pub mod storage;
pub mod world;
