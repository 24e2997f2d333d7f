//! Write the impact tables to CSV.
//!
//! Column order and decimal places are fixed per table so reruns diff
//! cleanly: currency amounts 2dp, fine relative changes 4dp, coarse
//! percentages 1dp, Gini values 6dp.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use crate::domain::{
    BudgetaryRow, ConstituencyRow, DecileRow, HeadcountRow, ImpactTables, InequalityRow, PovertyRow,
};
use crate::error::AppError;

pub const BUDGETARY_FILE: &str = "budgetary.csv";
pub const HEADCOUNTS_FILE: &str = "headcounts.csv";
pub const DISTRIBUTIONAL_FILE: &str = "distributional.csv";
pub const POVERTY_FILE: &str = "poverty.csv";
pub const INEQUALITY_FILE: &str = "inequality.csv";
pub const CONSTITUENCY_FILE: &str = "constituency.csv";

/// Render with exactly `dp` decimals; never prints `-0`.
///
/// Rounding is done once, by the formatter, on the exact binary value, so
/// ties land on the even digit (`12.5` -> `12`, `1.115` -> `1.11`).
pub fn fixed(value: f64, dp: usize) -> String {
    let out = format!("{value:.dp$}");
    match out.strip_prefix('-') {
        Some(digits) if digits.bytes().all(|b| b == b'0' || b == b'.') => digits.to_string(),
        _ => out,
    }
}

/// Write every available table into `dir`, returning the paths written.
pub fn write_tables(dir: &Path, tables: &ImpactTables) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::output(format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();

    let path = dir.join(BUDGETARY_FILE);
    write_budgetary_csv(&path, &tables.budgetary)?;
    written.push(path);

    let path = dir.join(HEADCOUNTS_FILE);
    write_headcounts_csv(&path, &tables.headcounts)?;
    written.push(path);

    let path = dir.join(DISTRIBUTIONAL_FILE);
    write_distributional_csv(&path, &tables.distributional)?;
    written.push(path);

    let path = dir.join(POVERTY_FILE);
    write_poverty_csv(&path, &tables.poverty)?;
    written.push(path);

    let path = dir.join(INEQUALITY_FILE);
    write_inequality_csv(&path, &tables.inequality)?;
    written.push(path);

    if let Some(rows) = &tables.constituency {
        let path = dir.join(CONSTITUENCY_FILE);
        write_constituency_csv(&path, rows)?;
        written.push(path);
    }

    Ok(written)
}

fn write_csv<T>(
    path: &Path,
    header: &[&str],
    rows: &[T],
    record: impl Fn(&T) -> Vec<String>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(header)
        .map_err(|e| AppError::output(format!("Failed to write header of '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .write_record(record(row))
            .map_err(|e| AppError::output(format!("Failed to write row of '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}

pub fn write_budgetary_csv(path: &Path, rows: &[BudgetaryRow]) -> Result<(), AppError> {
    write_csv(path, &["year", "budgetary_impact_bn"], rows, |r| {
        vec![r.year.label(), fixed(r.impact_bn, 2)]
    })
}

pub fn write_headcounts_csv(path: &Path, rows: &[HeadcountRow]) -> Result<(), AppError> {
    write_csv(
        path,
        &[
            "year",
            "total_households",
            "affected_households",
            "total_people",
            "affected_people",
            "total_children",
            "affected_children",
            "pct_households_affected",
            "pct_people_affected",
            "pct_children_affected",
            "avg_loss_per_affected_hh",
        ],
        rows,
        |r| {
            vec![
                r.year.label(),
                fixed(r.total_households, 0),
                fixed(r.affected_households, 0),
                fixed(r.total_people, 0),
                fixed(r.affected_people, 0),
                fixed(r.total_children, 0),
                fixed(r.affected_children, 0),
                fixed(r.pct_households_affected, 1),
                fixed(r.pct_people_affected, 1),
                fixed(r.pct_children_affected, 1),
                fixed(r.avg_loss_per_affected_hh, 2),
            ]
        },
    )
}

pub fn write_distributional_csv(path: &Path, rows: &[DecileRow]) -> Result<(), AppError> {
    write_csv(
        path,
        &["year", "decile", "avg_change_gbp", "relative_change_pct"],
        rows,
        |r| {
            vec![
                r.year.label(),
                r.decile.to_string(),
                fixed(r.avg_change, 2),
                fixed(r.relative_change_pct, 4),
            ]
        },
    )
}

pub fn write_poverty_csv(path: &Path, rows: &[PovertyRow]) -> Result<(), AppError> {
    write_csv(
        path,
        &[
            "year",
            "measure",
            "group",
            "baseline_rate_pct",
            "reform_rate_pct",
            "change_pp",
            "change_pct",
        ],
        rows,
        |r| {
            vec![
                r.year.label(),
                r.measure.label(),
                r.group.label().to_string(),
                fixed(r.baseline_rate_pct, 2),
                fixed(r.reform_rate_pct, 2),
                fixed(r.change_pp, 2),
                fixed(r.change_pct, 1),
            ]
        },
    )
}

pub fn write_inequality_csv(path: &Path, rows: &[InequalityRow]) -> Result<(), AppError> {
    write_csv(
        path,
        &["year", "baseline_gini", "reform_gini", "gini_change_pct"],
        rows,
        |r| {
            vec![
                r.year.label(),
                fixed(r.baseline_gini, 6),
                fixed(r.reform_gini, 6),
                fixed(r.gini_change_pct, 2),
            ]
        },
    )
}

pub fn write_constituency_csv(path: &Path, rows: &[ConstituencyRow]) -> Result<(), AppError> {
    write_csv(
        path,
        &[
            "year",
            "constituency_code",
            "constituency_name",
            "avg_change_gbp",
            "relative_change_pct",
        ],
        rows,
        |r| {
            vec![
                r.year.label(),
                r.code.clone(),
                r.name.clone(),
                fixed(r.avg_change, 2),
                fixed(r.relative_change_pct, 4),
            ]
        },
    )
}
