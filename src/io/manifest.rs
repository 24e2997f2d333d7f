//! Run manifest: what was computed, from which engine, into which files.
//!
//! Written next to the CSV tables as `manifest.json` so a dashboard can show
//! provenance without parsing the tables.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisConfig, DecileSource, PovertyMeasure, ReformSpec};
use crate::error::AppError;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Local>,
    pub engine: String,
    pub years: Vec<String>,
    /// Reform parameters, when this tool applied them (synthetic engine).
    pub reform: Option<ReformSpec>,
    pub poverty_measures: Vec<PovertyMeasure>,
    pub decile_source: DecileSource,
    pub files: Vec<String>,
}

impl RunManifest {
    pub fn new(config: &AnalysisConfig, engine: String, reform: Option<ReformSpec>, files: &[impl AsRef<Path>]) -> Self {
        Self {
            tool: "tcl".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Local::now(),
            engine,
            years: config.years.iter().map(|y| y.label()).collect(),
            reform,
            poverty_measures: config.poverty_measures.clone(),
            decile_source: config.decile_source,
            files: files
                .iter()
                .filter_map(|p| p.as_ref().file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create manifest '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::output(format!("Failed to write manifest: {e}")))?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open manifest '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid manifest JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn manifest_lists_file_names_and_reform() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default();
        let files = vec![PathBuf::from("/tmp/out/budgetary.csv"), PathBuf::from("poverty.csv")];
        let manifest = RunManifest::new(&config, "synthetic".into(), Some(ReformSpec::default()), &files);

        let path = dir.path().join(MANIFEST_FILE);
        write_manifest(&path, &manifest).unwrap();
        let back = read_manifest(&path).unwrap();

        assert_eq!(back.files, vec!["budgetary.csv", "poverty.csv"]);
        assert_eq!(back.years, vec!["2029-30", "2030-31"]);
        assert_eq!(back.reform, Some(ReformSpec::default()));
        assert_eq!(back.decile_source, DecileSource::Engine);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"absolute-bhc\""));
        assert!(raw.contains("\"from_year\": 2029"));
    }
}
