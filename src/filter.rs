use tracing::trace;

use crate::rows::PolicyRow;

/// Persisted filter inputs. Each field is last-write-wins on its own:
/// updating the search never resets the sector facet and vice versa.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    search: String,
    sector: String,
}

impl FilterState {
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_lowercase();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Empty string means all sectors.
    pub fn set_sector(&mut self, sector: &str) {
        self.sector = sector.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.sector.is_empty()
    }
}

/// Row visibility by position in the RowSet. Recomputed in full on
/// every filter change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilitySet {
    visible: Vec<bool>,
}

impl VisibilitySet {
    pub fn all(nrows: usize) -> Self {
        VisibilitySet {
            visible: vec![true; nrows],
        }
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        self.visible.get(idx).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    pub fn none_visible(&self) -> bool {
        !self.visible.iter().any(|&v| v)
    }
}

/// A row is visible iff its lowercased name contains the search term
/// (or the term is empty) and its sector equals the facet exactly (or
/// the facet is empty). Both predicates are re-applied from the
/// persisted state on every call.
pub fn compute_visibility(rows: &[PolicyRow], filter: &FilterState) -> VisibilitySet {
    let visible = rows
        .iter()
        .map(|row| {
            let matches_search =
                filter.search.is_empty() || row.name_lower().contains(&filter.search);
            let matches_sector = filter.sector.is_empty() || row.sector == filter.sector;
            matches_search && matches_sector
        })
        .collect::<Vec<bool>>();
    let set = VisibilitySet { visible };
    trace!(
        "Filter \"{}\"/\"{}\" leaves {}/{} rows visible",
        filter.search,
        filter.sector,
        set.count(),
        rows.len()
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{RawRecord, RowSet, build_rows};

    fn rows() -> RowSet {
        let records = [
            ("Offshore Wind Subsidy", "Energy"),
            ("Solar Tax Credit", "Energy"),
            ("Universal Basic Healthcare", "Healthcare"),
            ("Wind Down Coal Plants", "Energy"),
        ]
        .iter()
        .map(|(name, sector)| RawRecord {
            name: (*name).into(),
            sector: (*sector).into(),
            region: "Europe".into(),
            change: "0%".into(),
            gdp_impact: "0%".into(),
            inflation_impact: "0pp".into(),
            unemployment_impact: "0pp".into(),
        })
        .collect::<Vec<RawRecord>>();
        build_rows(&records)
    }

    #[test]
    fn empty_filter_keeps_everything_visible() {
        let rows = rows();
        let set = compute_visibility(&rows, &FilterState::default());
        assert_eq!(set.count(), rows.len());
        assert!(!set.none_visible());
    }

    #[test]
    fn search_matches_name_substring_case_insensitively() {
        let rows = rows();
        let mut filter = FilterState::default();
        filter.set_search("WIND");
        let set = compute_visibility(&rows, &filter);
        assert!(set.is_visible(0));
        assert!(!set.is_visible(1));
        assert!(!set.is_visible(2));
        assert!(set.is_visible(3));
    }

    #[test]
    fn sector_matches_exactly() {
        let rows = rows();
        let mut filter = FilterState::default();
        filter.set_sector("Energy");
        let set = compute_visibility(&rows, &filter);
        assert_eq!(set.count(), 3);
        assert!(!set.is_visible(2));
    }

    #[test]
    fn search_and_sector_are_order_independent() {
        let rows = rows();

        let mut a = FilterState::default();
        a.set_sector("Energy");
        a.set_search("wind");

        let mut b = FilterState::default();
        b.set_search("wind");
        b.set_sector("Energy");

        assert_eq!(a, b);
        assert_eq!(compute_visibility(&rows, &a), compute_visibility(&rows, &b));
        assert_eq!(compute_visibility(&rows, &a).count(), 2);
    }

    #[test]
    fn updating_one_field_preserves_the_other() {
        let mut filter = FilterState::default();
        filter.set_sector("Energy");
        filter.set_search("wind");
        assert_eq!(filter.sector(), "Energy");
        filter.set_search("solar");
        assert_eq!(filter.sector(), "Energy");
        filter.set_sector("");
        assert_eq!(filter.search(), "solar");
    }

    #[test]
    fn no_match_reports_none_visible() {
        let rows = rows();
        let mut filter = FilterState::default();
        filter.set_search("does not exist");
        let set = compute_visibility(&rows, &filter);
        assert!(set.none_visible());
        assert_eq!(set.count(), 0);
    }
}
