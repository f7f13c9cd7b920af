//! Source-text analyses that do not need the syntax tree
//!
//! Cheap facts computed directly from the raw contract text, currently the
//! compiler-version pragma checks the arithmetic detector short-circuits on.

pub mod version_parser;

pub use version_parser::{
    has_arithmetic_protection, pins_checked_arithmetic,
    pragma_constraints, SolidityVersion, VersionConstraint, VersionOperator,
};
