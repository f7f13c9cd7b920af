//! Command implementations for the VeriSecure CLI
//!
//! `audit` runs the detectors over contracts and emits reports; `detectors`
//! lists what the engine will run.

pub mod audit;
pub mod detectors;
