use crate::core::{Finding, Result, Severity};
use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate(report: &Report, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Self::generate_json(report),
            OutputFormat::Markdown => Ok(Self::generate_markdown(report)),
        }
    }

    fn generate_json(report: &Report) -> Result<String> {
        Ok(report.to_json()?)
    }

    fn generate_markdown(report: &Report) -> String {
        let mut out = String::new();
        let summary = report.summary();

        out.push_str("# Smart Contract Audit Report\n\n");
        let _ = writeln!(out, "**Contract**: `{}`", report.contract_path());
        let _ = writeln!(
            out,
            "**Generated**: {}",
            report.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "**Total Issues**: {}\n", report.issue_count());

        out.push_str("## Summary\n\n");
        out.push_str("| Severity | Count |\n");
        out.push_str("|----------|-------|\n");
        for severity in Severity::ALL {
            let _ = writeln!(
                out,
                "| {} {} | {} |",
                severity.emoji(),
                severity,
                summary.severity_counts.get(severity)
            );
        }
        out.push('\n');

        if !summary.detector_counts.is_empty() {
            out.push_str("| Detector | Count |\n");
            out.push_str("|----------|-------|\n");
            for (detector, count) in &summary.detector_counts {
                let _ = writeln!(out, "| {} | {} |", detector, count);
            }
            out.push('\n');
        }

        for severity in Severity::ALL {
            let findings = report.findings_for(severity);
            if findings.is_empty() {
                continue;
            }
            let _ = writeln!(out, "## {} Severity Issues\n", severity);
            Self::append_findings_table(&mut out, findings);
        }

        if let Some(ai) = report.ai() {
            out.push_str("## Narrative Analysis\n\n");
            let _ = writeln!(
                out,
                "> Model `{}`, {} ms\n",
                ai.analysis.model, ai.analysis.processing_time.elapsed_ms
            );
            out.push_str(&ai.analysis.analysis);
            out.push_str("\n\n");
        } else if let Some(error) = report.ai_error() {
            let _ = writeln!(out, "_Narrative analysis unavailable: {}_\n", error);
        }

        out
    }

    fn append_findings_table(out: &mut String, findings: &[Finding]) {
        out.push_str("| # | Line | Function | Detector | Finding |\n");
        out.push_str("|---|------|----------|----------|---------|\n");

        for (idx, finding) in findings.iter().enumerate() {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                idx + 1,
                finding.line,
                finding.function.as_deref().unwrap_or("-"),
                finding.detector,
                Self::escape_cell(&Self::truncate(&finding.details, 120)),
            );
        }
        out.push('\n');
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DetectorId;

    fn report() -> Report {
        Report::build(
            "Bank.sol",
            &[
                Finding::new(
                    DetectorId::Reentrancy,
                    Severity::High,
                    "Potential reentrancy vulnerability detected. State changes after external call.",
                    "Function withdraw | makes an external call",
                    4,
                )
                .with_function("withdraw"),
                Finding::new(
                    DetectorId::UncheckedCall,
                    Severity::Medium,
                    "Unchecked return value from external call",
                    "Return value from call is not checked",
                    5,
                ),
            ],
        )
    }

    #[test]
    fn test_markdown_sections() {
        let md = ReportGenerator::generate(&report(), OutputFormat::Markdown).unwrap();

        assert!(md.starts_with("# Smart Contract Audit Report"));
        assert!(md.contains("**Total Issues**: 2"));
        assert!(md.contains("## High Severity Issues"));
        assert!(md.contains("## Medium Severity Issues"));
        assert!(!md.contains("## Low Severity Issues"));
        assert!(md.contains("| 1 | 4 | withdraw | reentrancy |"));
        assert!(md.contains("withdraw \\| makes"));
    }

    #[test]
    fn test_json_matches_report_serialization() {
        let report = report();
        let json = ReportGenerator::generate(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issueCount"], 2);
        assert_eq!(value["issues"]["high"][0]["function"], "withdraw");
    }

    #[test]
    fn test_enhancement_error_rendered() {
        let degraded = report().with_enhancement_error("timeout");
        let md = ReportGenerator::generate(&degraded, OutputFormat::Markdown).unwrap();
        assert!(md.contains("Narrative analysis unavailable: timeout"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(ReportGenerator::truncate("short", 10), "short");
        assert_eq!(ReportGenerator::truncate("ééééééé", 5), "éé...");
    }
}
