use crate::core::{AuditError, DetectorId, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_enabled_detectors")]
    pub enabled_detectors: Vec<DetectorId>,

    /// Turn a detector fault into a `detector-error` finding instead of
    /// aborting the run.
    #[serde(default)]
    pub isolate_detector_faults: bool,

    #[serde(default)]
    pub narrative: NarrativeSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub analysis_file: Option<PathBuf>,
}

fn default_enabled_detectors() -> Vec<DetectorId> {
    DetectorId::BUILTIN.to_vec()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled_detectors: default_enabled_detectors(),
            isolate_detector_faults: false,
            narrative: NarrativeSettings::default(),
        }
    }
}

impl AuditConfig {
    pub fn is_enabled(&self, id: DetectorId) -> bool {
        self.enabled_detectors.contains(&id)
    }

    /// Load by extension: `.yaml`/`.yml` or `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(AuditError::Config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(detectors) = std::env::var("VERISECURE_DETECTORS") {
            config.enabled_detectors = parse_detector_list(&detectors)?;
        }

        if let Ok(isolate) = std::env::var("VERISECURE_ISOLATE_FAULTS") {
            config.isolate_detector_faults = matches!(isolate.trim(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enabled_detectors.contains(&DetectorId::DetectorError) {
            return Err(AuditError::Config(
                "detector-error is not a runnable detector".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn parse_detector_list(list: &str) -> Result<Vec<DetectorId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<DetectorId>().map_err(AuditError::Config))
        .collect()
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| AuditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.enabled_detectors, DetectorId::BUILTIN.to_vec());
        assert!(!config.isolate_detector_faults);
        assert!(!config.narrative.enabled);
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config: AuditConfig = serde_yaml::from_str("isolate_detector_faults: true\n").unwrap();
        assert!(config.isolate_detector_faults);
        assert_eq!(config.enabled_detectors.len(), 4);
    }

    #[test]
    fn test_yaml_detector_subset() {
        let yaml = "enabled_detectors:\n  - reentrancy\n  - access-control\n";
        let config: AuditConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.is_enabled(DetectorId::Reentrancy));
        assert!(!config.is_enabled(DetectorId::OverflowUnderflow));
    }

    #[test]
    fn test_parse_detector_list() {
        let ids = parse_detector_list("unchecked-call, reentrancy,").unwrap();
        assert_eq!(ids, vec![DetectorId::UncheckedCall, DetectorId::Reentrancy]);
        assert!(parse_detector_list("reentrancy,bogus").is_err());
    }

    #[test]
    fn test_synthetic_id_rejected() {
        let config = AuditConfig {
            enabled_detectors: vec![DetectorId::DetectorError],
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::Config(_))));
    }

    #[test]
    fn test_from_file_by_extension() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("verisecure.json");
        std::fs::write(&path, r#"{"enabled_detectors": ["overflow-underflow"]}"#)?;

        let config = AuditConfig::from_file(&path)?;
        assert_eq!(config.enabled_detectors, vec![DetectorId::OverflowUnderflow]);

        let unsupported = dir.path().join("verisecure.ini");
        std::fs::write(&unsupported, "")?;
        assert!(AuditConfig::from_file(&unsupported).is_err());
        Ok(())
    }
}
