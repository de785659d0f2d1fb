use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::codes::{CodeMap, CodeMapping, RawMapping};
use crate::error::{ReconError, Result};
use crate::tax_check::DEFAULT_TAX_CODES;

/// Which export a settings file describes; picks the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Job {
    Uchrabvr,
    Uder,
}

impl Job {
    pub fn default_config_path(&self) -> PathBuf {
        match self {
            Self::Uchrabvr => PathBuf::from("uchrabvr.json"),
            Self::Uder => PathBuf::from("uder.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level_console: String,
    pub level_file: String,
    pub log_format: String,
    pub file_log_path: String,
    pub input_file: String,
    pub output_file_path: String,
    /// Code page of the export and of the generated statements.
    pub encoding: String,
    pub table_name: String,
    pub last_month: String,
    pub tax_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<RawMapping>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_job(Job::Uchrabvr)
    }
}

impl Settings {
    pub fn for_job(job: Job) -> Self {
        let (log, input, format) = match job {
            Job::Uchrabvr => ("uchrabvr.log", "UCHRABVR.txt", "full"),
            Job::Uder => ("uder.log", "UDER.txt", "message"),
        };
        Self {
            level_console: "ERROR".to_string(),
            level_file: "INFO".to_string(),
            log_format: format.to_string(),
            file_log_path: log.to_string(),
            input_file: input.to_string(),
            output_file_path: "uchrabvr_update.lot".to_string(),
            encoding: "cp866".to_string(),
            table_name: "uchrabvr".to_string(),
            last_month: "6".to_string(),
            tax_codes: DEFAULT_TAX_CODES.iter().map(|c| c.to_string()).collect(),
            codes: None,
        }
    }

    /// Configured code table, or the built-in one when none is given.
    pub fn code_map(&self) -> Result<CodeMap> {
        match &self.codes {
            None => Ok(CodeMap::builtin()),
            Some(raw) => CodeMap::new(raw.iter().cloned().map(CodeMapping::from).collect()),
        }
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| ReconError::Settings(format!("Unknown encoding {:?}", self.encoding)))
    }

    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.input_file))
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.output_file_path))
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.file_log_path))
    }
}

/// Settings read from disk, remembering whether defaults had to stand in.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub settings: Settings,
    pub found: bool,
    pub path: PathBuf,
}

/// Read `path`, falling back to the job defaults when the file is missing.
/// Missing keys take their defaults; a malformed file is an error.
pub fn load_settings(path: &Path, job: Job) -> Result<Loaded> {
    if !path.exists() {
        return Ok(Loaded {
            settings: Settings::for_job(job),
            found: false,
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| ReconError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let mut merged = serde_json::to_value(Settings::for_job(job))?;
    let overrides: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ReconError::Settings(format!("{}: {e}", path.display())))?;
    let Some(overrides) = overrides.as_object() else {
        return Err(ReconError::Settings(format!(
            "{}: expected a JSON object",
            path.display()
        )));
    };
    if let Some(target) = merged.as_object_mut() {
        for (key, value) in overrides {
            target.insert(key.clone(), value.clone());
        }
    }
    let settings: Settings = serde_json::from_value(merged)
        .map_err(|e| ReconError::Settings(format!("{}: {e}", path.display())))?;
    Ok(Loaded {
        settings,
        found: true,
        path: path.to_path_buf(),
    })
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_job_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings(&dir.path().join("uder.json"), Job::Uder).unwrap();
        assert!(!loaded.found);
        assert_eq!(loaded.settings.input_file, "UDER.txt");
        assert_eq!(loaded.settings.file_log_path, "uder.log");
        assert_eq!(loaded.settings.log_format, "message");
        assert_eq!(loaded.settings.last_month, "6");
    }

    #[test]
    fn test_load_merges_with_job_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uder.json");
        std::fs::write(&path, r#"{"last_month": "9", "level_file": "debug"}"#).unwrap();
        let loaded = load_settings(&path, Job::Uder).unwrap();
        assert!(loaded.found);
        assert_eq!(loaded.settings.last_month, "9");
        assert_eq!(loaded.settings.level_file, "debug");
        assert_eq!(loaded.settings.input_file, "UDER.txt");
        assert_eq!(loaded.settings.tax_codes, vec!["13", "182"]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uchrabvr.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_settings(&path, Job::Uchrabvr).unwrap_err();
        assert!(matches!(err, ReconError::Settings(msg) if msg.contains("uchrabvr.json")));
    }

    #[test]
    fn test_builtin_codes_when_none_configured() {
        let map = Settings::default().code_map().unwrap();
        assert_eq!(map.mappings().len(), 8);
    }

    #[test]
    fn test_configured_codes_accept_scalar_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uchrabvr.json");
        std::fs::write(
            &path,
            r#"{"codes": [{"primary": "20", "secondary": ["315", "316"]},
                          {"primary": ["18", "48"], "secondary": "305"}]}"#,
        )
        .unwrap();
        let map = load_settings(&path, Job::Uchrabvr).unwrap().settings.code_map().unwrap();
        assert_eq!(map.mappings().len(), 2);
        assert_eq!(map.mapping_for_secondary("305").unwrap().primary.describe(), "18 or 48");
    }

    #[test]
    fn test_configured_duplicate_codes_fail() {
        let settings: Settings = serde_json::from_str(
            r#"{"codes": [{"primary": "20", "secondary": "305"},
                          {"primary": "18", "secondary": "305"}]}"#,
        )
        .unwrap();
        assert!(matches!(settings.code_map(), Err(ReconError::Configuration(_))));
    }

    #[test]
    fn test_encoding_defaults_to_cp866() {
        assert_eq!(Settings::default().encoding().unwrap(), encoding_rs::IBM866);
        let settings = Settings {
            encoding: "utf-8".to_string(),
            ..Settings::for_job(Job::Uder)
        };
        assert_eq!(settings.encoding().unwrap(), encoding_rs::UTF_8);
        let settings = Settings {
            encoding: "klingon".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.encoding(), Err(ReconError::Settings(_))));
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            let expanded = shellexpand_path("~/UCHRABVR.txt");
            assert!(expanded.starts_with(&*home.to_string_lossy()));
            assert!(expanded.ends_with("UCHRABVR.txt"));
        }
        assert_eq!(shellexpand_path("data/UDER.txt"), "data/UDER.txt");
    }
}
