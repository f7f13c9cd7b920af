//! Source representations consumed by the detectors
//!
//! Contract text is parsed with tree-sitter and lowered once into the typed
//! [`crate::ast::Node`] tree; detectors never touch the concrete grammar.

pub mod source;

pub use source::parse_source;
