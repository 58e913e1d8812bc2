use std::collections::HashMap;

use crate::format::strip_symbols;
use crate::rows::PolicyRow;

/// Policy count per cleaned sector label, descending. Drawn as the
/// sector bar chart; the drawing itself belongs to the UI.
pub fn sector_distribution(rows: &[PolicyRow]) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for row in rows {
        let sector = strip_symbols(&row.sector);
        *counts.entry(sector).or_insert(0) += 1;
    }
    let mut sorted: Vec<(u64, String)> = counts.into_iter().map(|(k, v)| (v, k)).collect();
    sorted.sort_unstable();
    sorted.reverse();
    sorted.into_iter().map(|(count, label)| (label, count)).collect()
}

/// The dashboard's stat strip: total count plus mean impacts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactSummary {
    pub policies: usize,
    pub avg_gdp: f64,
    pub avg_inflation: f64,
    pub avg_unemployment: f64,
}

pub fn impact_summary(rows: &[PolicyRow]) -> ImpactSummary {
    if rows.is_empty() {
        return ImpactSummary::default();
    }
    let n = rows.len() as f64;
    ImpactSummary {
        policies: rows.len(),
        avg_gdp: rows.iter().map(|r| r.gdp_impact).sum::<f64>() / n,
        avg_inflation: rows.iter().map(|r| r.inflation_impact).sum::<f64>() / n,
        avg_unemployment: rows.iter().map(|r| r.unemployment_impact).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{RawRecord, build_rows};

    fn record(sector: &str, gdp: &str) -> RawRecord {
        RawRecord {
            name: "p".into(),
            sector: sector.into(),
            region: "Asia".into(),
            change: "0%".into(),
            gdp_impact: gdp.into(),
            inflation_impact: "1.0pp".into(),
            unemployment_impact: "-1.0pp".into(),
        }
    }

    #[test]
    fn distribution_counts_cleaned_sectors_descending() {
        let rows = build_rows(&[
            record("Energy", "0%"),
            record("Energy!", "0%"),
            record("Healthcare", "0%"),
        ]);
        let dist = sector_distribution(&rows);
        assert_eq!(dist[0], ("Energy".to_string(), 2));
        assert_eq!(dist[1], ("Healthcare".to_string(), 1));
    }

    #[test]
    fn summary_averages_impacts() {
        let rows = build_rows(&[record("Energy", "1.0%"), record("Energy", "3.0%")]);
        let summary = impact_summary(&rows);
        assert_eq!(summary.policies, 2);
        assert_eq!(summary.avg_gdp, 2.0);
        assert_eq!(summary.avg_inflation, 1.0);
        assert_eq!(summary.avg_unemployment, -1.0);
    }

    #[test]
    fn summary_is_zero_safe_on_empty_data() {
        assert_eq!(impact_summary(&[]), ImpactSummary::default());
    }
}
