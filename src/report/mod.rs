//! Reporting utilities: constituency rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{ConstituencyRow, FiscalYear};

/// Hardest-hit and least-affected constituencies for one year (top-N each side).
#[derive(Debug, Clone)]
pub struct ConstituencyRankings {
    /// Most negative average change first.
    pub hardest_hit: Vec<ConstituencyRow>,
    /// Least negative (or most positive) average change first.
    pub least_affected: Vec<ConstituencyRow>,
}

/// Rank one year's constituencies by average change.
pub fn rank_constituencies(rows: &[ConstituencyRow], year: FiscalYear, top_n: usize) -> ConstituencyRankings {
    let mut sorted: Vec<ConstituencyRow> = rows.iter().filter(|r| r.year == year).cloned().collect();
    // Stable sort keeps reference order among ties.
    sorted.sort_by(|a, b| a.avg_change.total_cmp(&b.avg_change));

    let hardest_hit = sorted.iter().take(top_n).cloned().collect();
    let least_affected = sorted.iter().rev().take(top_n).cloned().collect();

    ConstituencyRankings {
        hardest_hit,
        least_affected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, code: &str, avg_change: f64) -> ConstituencyRow {
        ConstituencyRow {
            year: FiscalYear(year),
            code: code.to_string(),
            name: format!("Seat {code}"),
            avg_change,
            relative_change_pct: 0.0,
        }
    }

    #[test]
    fn ranks_within_requested_year_only() {
        let rows = vec![
            row(2029, "A", -500.0),
            row(2030, "A", -40.0),
            row(2030, "B", -300.0),
            row(2030, "C", -5.0),
            row(2030, "D", -120.0),
        ];
        let rankings = rank_constituencies(&rows, FiscalYear(2030), 2);
        let hardest: Vec<&str> = rankings.hardest_hit.iter().map(|r| r.code.as_str()).collect();
        let least: Vec<&str> = rankings.least_affected.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(hardest, vec!["B", "D"]);
        assert_eq!(least, vec!["C", "A"]);
    }

    #[test]
    fn top_n_larger_than_population() {
        let rows = vec![row(2029, "A", -1.0)];
        let rankings = rank_constituencies(&rows, FiscalYear(2029), 20);
        assert_eq!(rankings.hardest_hit.len(), 1);
        assert_eq!(rankings.least_affected.len(), 1);
    }
}
