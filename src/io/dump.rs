//! Load precomputed engine outputs from CSV dumps.
//!
//! Layout, one file per scenario, year and aggregation level:
//!
//! ```text
//! <dir>/baseline/2029/household.csv
//! <dir>/baseline/2029/person.csv
//! <dir>/reform/2029/household.csv
//! ...
//! ```
//!
//! Each file has a `weight` column plus one column per engine variable,
//! named as in the engine's catalog. Indicator columns may use
//! `true`/`false`.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::domain::{EntityLevel, FiscalYear, Scenario};
use crate::engine::{TableEngine, VariableTable};
use crate::error::AppError;

const WEIGHT_COLUMN: &str = "weight";

pub fn dump_path(dir: &Path, scenario: Scenario, year: FiscalYear, level: EntityLevel) -> PathBuf {
    dir.join(scenario.as_str())
        .join(year.start().to_string())
        .join(format!("{}.csv", level.as_str()))
}

/// Load every year and level for one scenario.
pub fn load_scenario(dir: &Path, scenario: Scenario, years: &[FiscalYear]) -> Result<TableEngine, AppError> {
    let mut engine = TableEngine::new(format!("{} dump at {}", scenario.as_str(), dir.display()));
    for &year in years {
        for level in EntityLevel::ALL {
            let path = dump_path(dir, scenario, year, level);
            let table = read_table(&path)?;
            debug!(path = %path.display(), rows = table.len(), "loaded engine dump");
            engine.insert_table(year, level, table);
        }
    }
    Ok(engine)
}

/// Read one dump file into a `VariableTable`.
pub fn read_table(path: &Path) -> Result<VariableTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open engine dump '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read headers of '{}': {e}", path.display())))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let weight_idx = headers
        .iter()
        .position(|h| h == WEIGHT_COLUMN)
        .ok_or_else(|| AppError::config(format!("'{}' has no `weight` column.", path.display())))?;

    let mut columns: HashMap<usize, Vec<f64>> = HashMap::new();
    let mut weights = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: header row, then 1-based line numbers
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::config(format!("{}:{line}: CSV parse error: {e}", path.display()))
        })?;

        for (col, name) in headers.iter().enumerate() {
            let value = parse_cell(&record, col).map_err(|e| {
                AppError::config(format!("{}:{line}: column `{name}`: {e}", path.display()))
            })?;
            if col == weight_idx {
                weights.push(value);
            } else {
                columns.entry(col).or_default().push(value);
            }
        }
    }

    let mut table = VariableTable::new(weights);
    for (col, name) in headers.into_iter().enumerate() {
        if col == weight_idx {
            continue;
        }
        let values = columns.remove(&col).unwrap_or_default();
        table.insert(name, values)?;
    }
    Ok(table)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_cell(record: &StringRecord, col: usize) -> Result<f64, String> {
    let raw = record.get(col).map(str::trim).unwrap_or("");
    match raw.to_ascii_lowercase().as_str() {
        "" => Err("missing value".to_string()),
        "true" => Ok(1.0),
        "false" => Ok(0.0),
        other => {
            let v = other
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{raw}'"))?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(format!("non-finite number '{raw}'"))
            }
        }
    }
}
