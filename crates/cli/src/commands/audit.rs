//! `verisecure audit`: run the detectors over one contract or a tree of them.
//!
//! Files are audited in parallel; each file is parsed and checked
//! sequentially, so per-file output is deterministic. A report is printed to
//! the console unless `--quiet`, and written as JSON or Markdown on request.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use verisecure_scanners::core::{parse_detector_list, AuditConfig, Finding, Severity};
use verisecure_scanners::narrative::FileNarrativeAnalyzer;
use verisecure_scanners::{
    audit_files, audit_with_narrative, AuditEngine, AuditError, AuditRun, OutputFormat, Report,
    ReportGenerator,
};
use walkdir::WalkDir;

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// Contract file, or a directory searched recursively for `.sol` files
    pub path: PathBuf,

    /// Write the JSON report here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a Markdown report here
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Attach the narrative analysis stored in this file
    #[arg(long)]
    pub narrative: Option<PathBuf>,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated detector ids to run
    #[arg(long)]
    pub detectors: Option<String>,

    /// Report detector faults as findings instead of aborting
    #[arg(long)]
    pub isolate_faults: bool,

    /// Suppress the console report
    #[arg(short, long)]
    pub quiet: bool,
}

impl AuditArgs {
    fn load_config(&self) -> Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AuditConfig::from_env()?,
        };

        if let Some(list) = &self.detectors {
            config.enabled_detectors = parse_detector_list(list)?;
        }
        if self.isolate_faults {
            config.isolate_detector_faults = true;
        }
        if let Some(file) = &self.narrative {
            config.narrative.enabled = true;
            config.narrative.analysis_file = Some(file.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn execute(args: AuditArgs) -> Result<()> {
    let config = args.load_config()?;
    let files = find_solidity_files(&args.path)?;
    if files.is_empty() {
        bail!("no Solidity files found in {}", args.path.display());
    }
    tracing::debug!(files = files.len(), "auditing");

    let engine = AuditEngine::new(config.clone());
    let results = match narrative_file(&config) {
        Some(file) => audit_with_narrative_sequentially(&files, &engine, file)?,
        None => audit_files(&files, &engine),
    };

    let mut reports = Vec::new();
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(run) => {
                if !args.quiet {
                    print_console_report(&run);
                }
                reports.push(run.report);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", "✗".red().bold(), path.display(), e);
            }
        }
    }

    if let Some(output) = &args.output {
        write_reports(output, &reports, OutputFormat::Json)?;
        if !args.quiet {
            println!("📄 JSON report written to {}", output.display());
        }
    }
    if let Some(markdown) = &args.markdown {
        write_reports(markdown, &reports, OutputFormat::Markdown)?;
        if !args.quiet {
            println!("📄 Markdown report written to {}", markdown.display());
        }
    }

    if failures > 0 {
        bail!("{} of {} contracts failed to audit", failures, files.len());
    }
    Ok(())
}

fn narrative_file(config: &AuditConfig) -> Option<&Path> {
    if !config.narrative.enabled {
        return None;
    }
    config.narrative.analysis_file.as_deref()
}

fn audit_with_narrative_sequentially(
    files: &[PathBuf],
    engine: &AuditEngine,
    narrative: &Path,
) -> Result<Vec<(PathBuf, Result<AuditRun, AuditError>)>> {
    let analyzer = FileNarrativeAnalyzer::new(narrative);
    let runtime = tokio::runtime::Runtime::new()?;

    Ok(runtime.block_on(async {
        let mut results = Vec::with_capacity(files.len());
        for path in files {
            let result = audit_with_narrative(path, engine, &analyzer).await;
            results.push((path.clone(), result));
        }
        results
    }))
}

fn find_solidity_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "sol") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// One report is written as-is; several become a JSON array or consecutive
/// Markdown documents.
fn write_reports(path: &Path, reports: &[Report], format: OutputFormat) -> Result<()> {
    let content = match (format, reports) {
        (_, [single]) => ReportGenerator::generate(single, format)?,
        (OutputFormat::Json, many) => serde_json::to_string_pretty(many)?,
        (OutputFormat::Markdown, many) => many
            .iter()
            .map(|report| ReportGenerator::generate(report, format))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n---\n\n"),
    };

    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn print_console_report(run: &AuditRun) {
    let report = &run.report;

    println!("\n{}", "====== SMART CONTRACT AUDIT REPORT ======".bold());
    println!("{}", format!("Contract: {}", report.contract_path()).bold());
    println!(
        "{}",
        format!("Date: {}", report.timestamp().format("%Y-%m-%d %H:%M:%S UTC")).bold()
    );
    println!("{}\n", format!("Total Issues: {}", report.issue_count()).bold());

    for severity in Severity::ALL {
        let findings = report.findings_for(severity);
        if findings.is_empty() {
            println!(
                "{}",
                format!("✅ No {} severity issues found", severity.as_str()).green()
            );
            continue;
        }

        println!(
            "{}",
            format!(
                "{} {} SEVERITY ISSUES: {}",
                severity.emoji(),
                severity.as_str().to_uppercase(),
                findings.len()
            )
            .color(severity.color())
            .bold()
        );
        for finding in findings {
            print_finding(finding);
        }
    }

    let summary = report.summary();
    println!("\n{}", "====== SUMMARY ======".bold());
    println!("Issues by Severity:");
    for severity in Severity::ALL {
        println!("  {}: {}", severity, summary.severity_counts.get(severity));
    }
    if !summary.detector_counts.is_empty() {
        println!("Issues by Detector:");
        for (detector, count) in &summary.detector_counts {
            println!("  {}: {}", detector, count);
        }
    }

    if let Some(ai) = report.ai() {
        println!("\n{}", "====== NARRATIVE ANALYSIS ======".bold());
        println!("Model: {}", ai.analysis.model);
        println!("{}", ai.analysis.analysis);
    } else if let Some(error) = report.ai_error() {
        println!("\n{} {}", "⚠️  Narrative analysis unavailable:".yellow(), error);
    }
}

fn print_finding(finding: &Finding) {
    let tag = format!("[{}]", finding.severity.as_str().to_uppercase())
        .color(finding.severity.color())
        .bold();

    println!("\n{} {}", tag, finding.description);
    println!("  Line: {}", finding.line);
    if let Some(function) = &finding.function {
        println!("  Function: {}", function);
    }
    println!("  Detector: {}", finding.detector);
    println!("  Details: {}", finding.details.dimmed());
    if let Some(locations) = &finding.extra_locations {
        let rendered: Vec<String> = locations
            .iter()
            .map(|loc| format!("{}:{}", loc.line, loc.column))
            .collect();
        println!("  State changes: {}", rendered.join(", "));
    }
}
