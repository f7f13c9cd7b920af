//! Solidity Version Pragma Parser
//!
//! Extracts the compiler constraint from `pragma solidity` directives so the
//! arithmetic detector can tell when checked arithmetic is already in force.

use once_cell::sync::Lazy;
use regex::Regex;

static PRAGMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pragma\s+solidity\s+([^;]*);?").expect("valid pragma regex"));

static COMPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\^|~|>=|<=|>|<|=)?\s*(\d+)(?:\.(\d+))?(?:\.(\d+))?")
        .expect("valid comparator regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidityVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SolidityVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOperator {
    Caret,
    Tilde,
    GreaterEq,
    LessEq,
    Greater,
    Less,
    Exact,
}

impl VersionOperator {
    fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("^") => Self::Caret,
            Some("~") => Self::Tilde,
            Some(">=") => Self::GreaterEq,
            Some("<=") => Self::LessEq,
            Some(">") => Self::Greater,
            Some("<") => Self::Less,
            _ => Self::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub operator: VersionOperator,
    pub version: SolidityVersion,
}

/// Leading comparator of every `pragma solidity` directive, in source order.
pub fn pragma_constraints(source: &str) -> Vec<VersionConstraint> {
    PRAGMA_RE
        .captures_iter(source)
        .filter_map(|pragma| {
            let constraint = pragma.get(1)?.as_str();
            let comparator = COMPARATOR_RE.captures(constraint)?;
            let number = |idx: usize| {
                comparator
                    .get(idx)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
            };
            Some(VersionConstraint {
                operator: VersionOperator::from_token(comparator.get(1).map(|m| m.as_str())),
                version: SolidityVersion::new(
                    number(2)?,
                    number(3).unwrap_or(0),
                    number(4).unwrap_or(0),
                ),
            })
        })
        .collect()
}

/// A pragma pinned with `^0.8` or `>=0.8` (any patch level).
pub fn pins_checked_arithmetic(source: &str) -> bool {
    pragma_constraints(source).iter().any(|c| {
        matches!(c.operator, VersionOperator::Caret | VersionOperator::GreaterEq)
            && c.version.major == 0
            && c.version.minor == 8
    })
}

/// Arithmetic is treated as protected by the library or by the compiler.
pub fn has_arithmetic_protection(source: &str) -> bool {
    source.contains("SafeMath") || pins_checked_arithmetic(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_version() {
        let constraints = pragma_constraints("pragma solidity 0.8.19;");
        assert_eq!(constraints[0].operator, VersionOperator::Exact);
        assert_eq!(constraints[0].version, SolidityVersion::new(0, 8, 19));
    }

    #[test]
    fn test_parse_caret_version() {
        let constraints = pragma_constraints("pragma solidity ^0.8.0;");
        assert_eq!(constraints[0].operator, VersionOperator::Caret);
        assert_eq!(constraints[0].version, SolidityVersion::new(0, 8, 0));
    }

    #[test]
    fn test_parse_range_takes_leading_comparator() {
        let constraints = pragma_constraints("pragma solidity >=0.7.0 <0.9.0;");
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].operator, VersionOperator::GreaterEq);
        assert_eq!(constraints[0].version, SolidityVersion::new(0, 7, 0));
    }

    #[test]
    fn test_short_version() {
        let constraints = pragma_constraints("pragma solidity ^0.7; function f() public {}");
        assert_eq!(constraints[0].version, SolidityVersion::new(0, 7, 0));
    }

    #[test]
    fn test_pins_checked_arithmetic() {
        assert!(pins_checked_arithmetic("pragma solidity ^0.8.20;"));
        assert!(pins_checked_arithmetic("pragma solidity >=0.8.0 <0.9.0;"));
        assert!(pins_checked_arithmetic("pragma solidity ^ 0.8;"));
        assert!(!pins_checked_arithmetic("pragma solidity ^0.7.6;"));
        assert!(!pins_checked_arithmetic("pragma solidity 0.8.19;"));
        assert!(!pins_checked_arithmetic("pragma solidity >=0.7.0 <0.9.0;"));
        assert!(!pins_checked_arithmetic("contract NoPragma {}"));
    }

    #[test]
    fn test_safemath_counts_as_protection() {
        let source = "pragma solidity ^0.6.12;\nimport \"./SafeMath.sol\";";
        assert!(has_arithmetic_protection(source));
        assert!(!has_arithmetic_protection("pragma solidity ^0.6.12;"));
    }
}
