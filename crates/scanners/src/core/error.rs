use crate::core::DetectorId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AuditError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to load Solidity grammar: {0}")]
    Grammar(String),

    #[error("detector {detector} failed: {fault}")]
    Detector {
        detector: DetectorId,
        #[source]
        fault: DetectorFault,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A detector met a node shape it cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected {node_kind} at line {line}: {message}")]
pub struct DetectorFault {
    pub node_kind: String,
    pub line: usize,
    pub message: String,
}

impl DetectorFault {
    pub fn new(node_kind: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            node_kind: node_kind.into(),
            line,
            message: message.into(),
        }
    }
}
