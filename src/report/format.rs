//! Formatted terminal output.
//!
//! We keep formatting code in one place so the aggregation code stays free of
//! presentation concerns and output changes are localized.

use crate::domain::{AnalysisConfig, ConstituencyRow, ImpactTables, ReformSpec};
use crate::report::rank_constituencies;

const RULE_WIDTH: usize = 70;

/// Printed under both banners when figures come from the synthetic population.
pub const SYNTHETIC_NOTE: &str =
    "*** SYNTHETIC ILLUSTRATION: toy population and rules, not official estimates ***";

/// Banner printed before the analyses run.
///
/// `reform` is only known when this tool applied it, i.e. for synthetic runs.
pub fn format_run_header(config: &AnalysisConfig, engine: &str, reform: Option<&ReformSpec>) -> String {
    let mut out = String::new();
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\nTwo-child benefit limit reintroduction analysis\n");
    if reform.is_some() {
        out.push_str(SYNTHETIC_NOTE);
        out.push('\n');
    }
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str("Baseline: current law (no two-child limit)\n");
    match reform {
        Some(r) => out.push_str(&format!(
            "Reform:   two-child limit (child_count = {}) from {}{}\n",
            r.child_count,
            r.from_year,
            if r.scottish_payment {
                ", Scottish payment kept"
            } else {
                ", Scottish payment off"
            }
        )),
        None => out.push_str("Reform:   as precomputed by the engine\n"),
    }
    let years: Vec<String> = config.years.iter().map(|y| y.label()).collect();
    out.push_str(&format!("Years:    {}\n", years.join(", ")));
    out.push_str(&format!("Engine:   {engine}\n"));
    out
}

/// Full results summary (all tables, detail for the last year).
pub fn format_summary(tables: &ImpactTables, config: &AnalysisConfig, synthetic: bool) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\nREINTRODUCING THE TWO-CHILD BENEFIT LIMIT\n");
    if synthetic {
        out.push_str(SYNTHETIC_NOTE);
        out.push('\n');
    }
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    out.push_str("\n--- BUDGETARY IMPACT ---\n");
    out.push_str(&format!("{:<8} {:>14}\n", "year", "impact (bn)"));
    for r in &tables.budgetary {
        out.push_str(&format!("{:<8} {:>+14.2}\n", r.year.label(), r.impact_bn));
    }

    out.push_str("\n--- HEADCOUNTS ---\n");
    for r in &tables.headcounts {
        out.push_str(&format!("{}:\n", r.year));
        out.push_str(&format!("  Total population:    {:>12.0}\n", r.total_people));
        out.push_str(&format!("  Total households:    {:>12.0}\n", r.total_households));
        out.push_str(&format!("  Total children:      {:>12.0}\n", r.total_children));
        out.push_str(&format!(
            "  Affected households: {:>12.0} ({:.1}%)\n",
            r.affected_households, r.pct_households_affected
        ));
        out.push_str(&format!(
            "  Affected people:     {:>12.0} ({:.1}%)\n",
            r.affected_people, r.pct_people_affected
        ));
        out.push_str(&format!(
            "  Affected children:   {:>12.0} ({:.1}%)\n",
            r.affected_children, r.pct_children_affected
        ));
        out.push_str(&format!(
            "  Avg change per affected household: {:.0}/yr\n",
            r.avg_loss_per_affected_hh
        ));
    }

    let Some(&last_year) = config.years.last() else {
        return out;
    };

    out.push_str(&format!("\n--- DISTRIBUTIONAL IMPACT ({last_year}) ---\n"));
    out.push_str(&format!("{:>6} {:>14} {:>12}\n", "decile", "avg change", "relative %"));
    for r in tables.distributional.iter().filter(|r| r.year == last_year) {
        out.push_str(&format!(
            "{:>6} {:>14.2} {:>12.4}\n",
            r.decile, r.avg_change, r.relative_change_pct
        ));
    }

    out.push_str("\n--- POVERTY IMPACT ---\n");
    out.push_str(&format!(
        "{:<8} {:<14} {:<9} {:>9} {:>9} {:>8} {:>8}\n",
        "year", "measure", "group", "baseline", "reform", "pp", "%"
    ));
    for r in &tables.poverty {
        out.push_str(&format!(
            "{:<8} {:<14} {:<9} {:>9.2} {:>9.2} {:>+8.2} {:>+8.1}\n",
            r.year.label(),
            r.measure.label(),
            r.group.label(),
            r.baseline_rate_pct,
            r.reform_rate_pct,
            r.change_pp,
            r.change_pct
        ));
    }

    out.push_str("\n--- INEQUALITY IMPACT ---\n");
    out.push_str(&format!(
        "{:<8} {:>10} {:>10} {:>9}\n",
        "year", "baseline", "reform", "change %"
    ));
    for r in &tables.inequality {
        out.push_str(&format!(
            "{:<8} {:>10.6} {:>10.6} {:>+9.2}\n",
            r.year.label(),
            r.baseline_gini,
            r.reform_gini,
            r.gini_change_pct
        ));
    }

    if let Some(rows) = &tables.constituency {
        let rankings = rank_constituencies(rows, last_year, config.top_n);
        out.push_str(&format!(
            "\n--- CONSTITUENCY IMPACT ({last_year}, top {} hardest hit) ---\n",
            config.top_n
        ));
        out.push_str(&format_constituency_table(&rankings.hardest_hit));
        out.push_str(&format!(
            "\n--- CONSTITUENCY IMPACT ({last_year}, {} least affected) ---\n",
            config.top_n
        ));
        out.push_str(&format_constituency_table(&rankings.least_affected));
    }

    out
}

fn format_constituency_table(rows: &[ConstituencyRow]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<40} {:>12} {:>12}\n", "constituency", "avg change", "relative %").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<40} {:-<12} {:-<12}\n", "", "", "").trim_end());
    out.push('\n');
    for r in rows {
        out.push_str(
            format!(
                "{:<40} {:>12.2} {:>12.4}\n",
                truncate(&r.name, 40),
                r.avg_change,
                r.relative_change_pct
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetaryRow, DecileRow, FiscalYear};

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Ynys Môn", 40), "Ynys Môn");
        assert_eq!(truncate("Caithness, Sutherland and Easter Ross", 10), "Caithness.");
    }

    #[test]
    fn summary_shows_last_year_deciles_only() {
        let config = AnalysisConfig::default();
        let tables = ImpactTables {
            budgetary: vec![BudgetaryRow {
                year: FiscalYear(2029),
                impact_bn: 2.5,
            }],
            distributional: vec![
                DecileRow {
                    year: FiscalYear(2029),
                    decile: 1,
                    avg_change: -111.0,
                    relative_change_pct: -1.0,
                },
                DecileRow {
                    year: FiscalYear(2030),
                    decile: 1,
                    avg_change: -222.0,
                    relative_change_pct: -2.0,
                },
            ],
            ..ImpactTables::default()
        };
        let text = format_summary(&tables, &config, false);
        assert!(text.contains("+2.50"));
        assert!(text.contains("DISTRIBUTIONAL IMPACT (2030-31)"));
        assert!(text.contains("-222.00"));
        assert!(!text.contains("-111.00"));
        assert!(!text.contains("CONSTITUENCY"));
        assert!(!text.contains(SYNTHETIC_NOTE));
    }

    #[test]
    fn synthetic_runs_are_flagged_in_both_banners() {
        let config = AnalysisConfig::default();
        let summary = format_summary(&ImpactTables::default(), &config, true);
        let banner_end = summary.find("--- BUDGETARY").unwrap();
        assert!(summary[..banner_end].contains(SYNTHETIC_NOTE));

        let header = format_run_header(&config, "synthetic", Some(&ReformSpec::default()));
        assert!(header.contains(SYNTHETIC_NOTE));
        let dumps = format_run_header(&config, "reform dump at d", None);
        assert!(!dumps.contains(SYNTHETIC_NOTE));
    }

    #[test]
    fn header_describes_reform() {
        let config = AnalysisConfig::default();
        let text = format_run_header(&config, "synthetic", Some(&ReformSpec::default()));
        assert!(text.contains("child_count = 2"));
        assert!(text.contains("from 2029-30"));
        assert!(text.contains("2029-30, 2030-31"));
    }
}
