//! Constituency reference data.
//!
//! Two files, both optional as a pair:
//! - a constituency list CSV with `code` and `name` columns (extra columns ignored)
//! - a weight matrix, row `i` holding constituency `i`'s weight for every
//!   household in the national sample; either a 2-D dataset in an HDF5 file
//!   (`.h5`/`.hdf5`, needs the `hdf5` feature) or a header-less CSV
//!
//! When either file is missing the constituency analysis is skipped. Files
//! that exist but are malformed are still errors.

use std::fs::File;
use std::path::Path;

use nalgebra::DMatrix;
use tracing::{info, warn};

use crate::domain::ReferencePaths;
use crate::error::AppError;
use crate::impact::{Constituency, RegionWeights};

/// Load the constituency list and weights, or `None` if either file is absent.
pub fn load_region_weights(paths: &ReferencePaths) -> Result<Option<RegionWeights>, AppError> {
    if !paths.constituencies.exists() || !paths.weights.exists() {
        warn!(
            constituencies = %paths.constituencies.display(),
            weights = %paths.weights.display(),
            "Constituency data not found, skipping."
        );
        return Ok(None);
    }

    let regions = read_constituencies(&paths.constituencies)?;
    let matrix = read_region_matrix(&paths.weights, &paths.weights_dataset)?;
    let weights = RegionWeights::new(regions, matrix)?;
    info!(
        "Loaded {} constituencies x {} households of reference weights.",
        weights.len(),
        weights.n_households()
    );
    Ok(Some(weights))
}

pub fn read_constituencies(path: &Path) -> Result<Vec<Constituency>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read headers of '{}': {e}", path.display())))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::config(format!("'{}' is missing the `{name}` column.", path.display())))
    };
    let code_idx = find("code")?;
    let name_idx = find("name")?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::config(format!("{}:{line}: CSV parse error: {e}", path.display())))?;
        let field = |i: usize, what: &str| {
            record
                .get(i)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::config(format!("{}:{line}: missing {what}.", path.display())))
        };
        out.push(Constituency {
            code: field(code_idx, "code")?,
            name: field(name_idx, "name")?,
        });
    }
    Ok(out)
}

/// Read the weight matrix, choosing the format by file extension.
pub fn read_region_matrix(path: &Path, dataset: &str) -> Result<DMatrix<f64>, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("h5" | "hdf5") => read_weight_matrix_hdf5(path, dataset),
        _ => read_weight_matrix(path),
    }
}

#[cfg(feature = "hdf5")]
pub fn read_weight_matrix_hdf5(path: &Path, dataset: &str) -> Result<DMatrix<f64>, AppError> {
    let file = hdf5::File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open '{}': {e}", path.display())))?;
    let array = file
        .dataset(dataset)
        .map_err(|e| AppError::config(format!("'{}' has no dataset `{dataset}`: {e}", path.display())))?
        .read_2d::<f64>()
        .map_err(|e| {
            AppError::data(format!(
                "'{}': dataset `{dataset}` is not a 2-D float matrix: {e}",
                path.display()
            ))
        })?;

    let (n_rows, n_cols) = array.dim();
    // Logical (row-major) order regardless of the array's memory layout.
    let data: Vec<f64> = array.iter().copied().collect();
    Ok(DMatrix::from_row_slice(n_rows, n_cols, &data))
}

#[cfg(not(feature = "hdf5"))]
pub fn read_weight_matrix_hdf5(path: &Path, _dataset: &str) -> Result<DMatrix<f64>, AppError> {
    Err(AppError::config(format!(
        "'{}' is an HDF5 file but this build has no HDF5 support; rebuild with `--features hdf5` or supply the matrix as CSV.",
        path.display()
    )))
}

/// Header-less CSV, one row per constituency.
pub fn read_weight_matrix(path: &Path) -> Result<DMatrix<f64>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut data = Vec::new();
    let mut n_rows = 0usize;
    let mut n_cols = None;
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result
            .map_err(|e| AppError::data(format!("{}:{line}: {e}", path.display())))?;
        if *n_cols.get_or_insert(record.len()) != record.len() {
            return Err(AppError::data(format!("{}:{line}: ragged weight row.", path.display())));
        }
        for cell in record.iter() {
            let w = cell
                .parse::<f64>()
                .map_err(|_| AppError::data(format!("{}:{line}: invalid weight '{cell}'.", path.display())))?;
            data.push(w);
        }
        n_rows += 1;
    }

    Ok(DMatrix::from_row_slice(n_rows, n_cols.unwrap_or(0), &data))
}
