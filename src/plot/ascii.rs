//! ASCII bar chart of the distributional impact for terminal output.
//!
//! Fixed-width and deterministic so it can be checked with golden tests.
//! Losses extend left of the axis, gains extend right.

use crate::domain::{DecileRow, FiscalYear};

/// Render one year's decile changes as a diverging horizontal bar chart.
pub fn render_decile_bars(rows: &[DecileRow], year: FiscalYear, width: usize) -> String {
    let width = width.max(10);
    let half = width / 2;

    let rows: Vec<&DecileRow> = rows.iter().filter(|r| r.year == year).collect();
    let max_abs = rows
        .iter()
        .map(|r| r.avg_change.abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let scale = if max_abs > 0.0 { max_abs } else { 1.0 };

    let mut out = String::new();
    out.push_str(&format!(
        "Average change per household by decile ({year}) | full bar = {scale:.2}\n"
    ));

    for r in rows {
        let len = bar_len(r.avg_change, scale, half);
        let (left, right) = if r.avg_change < 0.0 {
            (format!("{:>half$}", "#".repeat(len)), " ".repeat(half))
        } else {
            (" ".repeat(half), format!("{:<half$}", "#".repeat(len)))
        };
        let value = if r.avg_change == 0.0 { 0.0 } else { r.avg_change };
        out.push_str(&format!("{:>2} {left}|{right} {value:+.2}\n", r.decile));
    }

    out
}

fn bar_len(value: f64, scale: f64, half: usize) -> usize {
    if !value.is_finite() {
        return 0;
    }
    let u = (value.abs() / scale).clamp(0.0, 1.0);
    (u * half as f64).round() as usize
}
