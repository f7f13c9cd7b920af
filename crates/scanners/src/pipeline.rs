//! End-to-end audit flows: source text or file in, [`AuditRun`] out.

use crate::core::{AuditError, Result};
use crate::narrative::NarrativeAnalyzer;
use crate::representations::parse_source;
use crate::runner::{AuditEngine, AuditRun};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse `source`, run the engine and build the report.
pub fn audit_source(contract_path: &str, source: &str, engine: &AuditEngine) -> Result<AuditRun> {
    let tree = parse_source(source)?;
    engine.audit(contract_path, &tree, source)
}

pub fn audit_file(path: &Path, engine: &AuditEngine) -> Result<AuditRun> {
    let source = read_source(path)?;
    audit_source(&path.display().to_string(), &source, engine)
}

/// Audit several files in parallel. Results keep the order of `paths`; each
/// file is still processed sequentially.
pub fn audit_files(paths: &[PathBuf], engine: &AuditEngine) -> Vec<(PathBuf, Result<AuditRun>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), audit_file(path, engine)))
        .collect()
}

/// Audit, then attach a narrative analysis. A failing analyzer leaves the
/// base report intact with `aiError` set.
pub async fn audit_with_narrative(
    path: &Path,
    engine: &AuditEngine,
    analyzer: &dyn NarrativeAnalyzer,
) -> Result<AuditRun> {
    let source = read_source(path)?;
    let mut run = audit_source(&path.display().to_string(), &source, engine)?;

    debug!(model = analyzer.model_name(), "requesting narrative analysis");
    run.report = match analyzer.analyze(&source).await {
        Ok(analysis) => run.report.enhance(analysis),
        Err(e) => {
            warn!(error = %e, "narrative analysis failed, keeping base report");
            run.report.with_enhancement_error(e.to_string())
        }
    };

    Ok(run)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| AuditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DetectorId, Severity};
    use crate::narrative::MockNarrativeAnalyzer;

    const UNGUARDED: &str = r#"pragma solidity ^0.7.0;

contract Counter {
    uint count;

    function bump() public {
        count = count + 1;
    }
}
"#;

    #[test]
    fn test_audit_source() {
        let run = audit_source("Counter.sol", UNGUARDED, &AuditEngine::default()).unwrap();

        assert_eq!(run.report.contract_path(), "Counter.sol");
        assert_eq!(run.report.count_for(DetectorId::OverflowUnderflow), 1);
        assert_eq!(run.report.count_for(DetectorId::AccessControl), 1);
        assert_eq!(run.report.findings_for(Severity::High).len(), 1);
    }

    #[test]
    fn test_parse_failure_aborts() {
        let result = audit_source("Broken.sol", "contract {", &AuditEngine::default());
        assert!(matches!(result, Err(AuditError::Parse { line, .. }) if line >= 1));
    }

    #[test]
    fn test_missing_file() {
        let result = audit_file(Path::new("/nonexistent/Missing.sol"), &AuditEngine::default());
        assert!(matches!(result, Err(AuditError::Io { .. })));
    }

    #[test]
    fn test_audit_files_keeps_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("Counter.sol");
        let bad = dir.path().join("Broken.sol");
        std::fs::write(&good, UNGUARDED)?;
        std::fs::write(&bad, "contract {")?;

        let results = audit_files(&[good.clone(), bad.clone()], &AuditEngine::default());

        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, bad);
        assert!(results[1].1.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_narrative_attached() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Counter.sol");
        std::fs::write(&path, UNGUARDED)?;
        let analyzer = MockNarrativeAnalyzer::with_response("bump is callable by anyone");

        let run = audit_with_narrative(&path, &AuditEngine::default(), &analyzer).await?;

        assert_eq!(analyzer.call_count(), 1);
        let ai = run.report.ai().unwrap();
        assert_eq!(ai.analysis.analysis, "bump is callable by anyone");
        assert!(run.report.ai_error().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_narrative_failure_degrades() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Counter.sol");
        std::fs::write(&path, UNGUARDED)?;

        let run = audit_with_narrative(
            &path,
            &AuditEngine::default(),
            &MockNarrativeAnalyzer::failing(),
        )
        .await?;

        assert!(run.report.ai().is_none());
        assert!(run.report.ai_error().is_some());
        assert_eq!(run.report.issue_count(), 2);
        Ok(())
    }
}
