use anyhow::Result;
use colored::*;
use verisecure_scanners::AuditEngine;

pub fn execute(json: bool) -> Result<()> {
    let detectors = AuditEngine::default().list_detectors();

    if json {
        println!("{}", serde_json::to_string_pretty(&detectors)?);
        return Ok(());
    }

    println!("{}", "Available detectors".bold());
    for info in detectors {
        println!(
            "  {:<20} {:<8} {}",
            info.id.to_string().bright_cyan(),
            info.severity.to_string().color(info.severity.color()),
            info.description
        );
    }
    Ok(())
}
