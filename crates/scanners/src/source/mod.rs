//! Source-level vulnerability detectors
//!
//! Each detector is a single best-effort walk over the typed syntax tree,
//! occasionally helped by a plain-text look at the contract source. None of
//! them tracks data flow; they stay syntactic on purpose so their output is
//! predictable and easy to explain in a report.

pub mod access_control;
pub mod overflow_underflow;
pub mod reentrancy;
pub mod unchecked_calls;

pub use access_control::{contract_facts, AccessControlDetector, ContractFacts};
pub use overflow_underflow::OverflowUnderflowDetector;
pub use reentrancy::ReentrancyDetector;
pub use unchecked_calls::UncheckedCallDetector;
