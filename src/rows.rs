use crate::format::{format_decimal, format_percentage, parse_number};

pub const COLUMN_COUNT: usize = 8;

/// Table columns in display order. The trailing Details column carries
/// row controls and is never sorted or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnId {
    Name,
    Sector,
    Region,
    Change,
    GdpImpact,
    InflationImpact,
    UnemploymentImpact,
    Details,
}

impl ColumnId {
    pub const ALL: [ColumnId; COLUMN_COUNT] = [
        ColumnId::Name,
        ColumnId::Sector,
        ColumnId::Region,
        ColumnId::Change,
        ColumnId::GdpImpact,
        ColumnId::InflationImpact,
        ColumnId::UnemploymentImpact,
        ColumnId::Details,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnId::Name => "Policy Name",
            ColumnId::Sector => "Sector",
            ColumnId::Region => "Region",
            ColumnId::Change => "Change (%)",
            ColumnId::GdpImpact => "GDP Impact (%)",
            ColumnId::InflationImpact => "Inflation (pp)",
            ColumnId::UnemploymentImpact => "Unemployment (pp)",
            ColumnId::Details => "Details",
        }
    }

    pub fn sortable(&self) -> bool {
        !matches!(self, ColumnId::Details)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One record as delivered by a DataProvider. Numeric fields are still
/// display text, the Row Model derives the typed values from them.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub name: String,
    pub sector: String,
    pub region: String,
    pub change: String,
    pub gdp_impact: String,
    pub inflation_impact: String,
    pub unemployment_impact: String,
}

/// Typed row. The lowercased name and the rendered cells are computed
/// once at construction.
#[derive(Debug, Clone)]
pub struct PolicyRow {
    pub name: String,
    pub sector: String,
    pub region: String,
    pub change: f64,
    pub gdp_impact: f64,
    pub inflation_impact: f64,
    pub unemployment_impact: f64,
    name_lower: String,
    cells: [String; COLUMN_COUNT],
}

impl PolicyRow {
    pub fn from_record(record: &RawRecord) -> Self {
        let name = record.name.trim().to_string();
        let sector = record.sector.trim().to_string();
        let region = record.region.trim().to_string();
        let change = parse_number(&record.change, "%");
        let gdp_impact = parse_number(&record.gdp_impact, "%");
        let inflation_impact = parse_number(&record.inflation_impact, "pp");
        let unemployment_impact = parse_number(&record.unemployment_impact, "pp");

        let cells = [
            name.clone(),
            sector.clone(),
            region.clone(),
            format_percentage(change),
            format_percentage(gdp_impact),
            format!("{}pp", format_decimal(inflation_impact)),
            format!("{}pp", format_decimal(unemployment_impact)),
            "View".to_string(),
        ];

        PolicyRow {
            name_lower: name.to_lowercase(),
            name,
            sector,
            region,
            change,
            gdp_impact,
            inflation_impact,
            unemployment_impact,
            cells,
        }
    }

    pub fn cell(&self, column: ColumnId) -> &str {
        &self.cells[column.index()]
    }

    pub fn name_lower(&self) -> &str {
        &self.name_lower
    }
}

/// Ordered snapshot of all rows, insertion order equal to provider order.
pub type RowSet = Vec<PolicyRow>;

pub fn build_rows(records: &[RawRecord]) -> RowSet {
    records.iter().map(PolicyRow::from_record).collect()
}

/// Distinct sectors present in the row set, sorted. Feeds the facet cycle.
pub fn sector_values(rows: &[PolicyRow]) -> Vec<String> {
    let mut sectors: Vec<String> = rows.iter().map(|r| r.sector.clone()).collect();
    sectors.sort();
    sectors.dedup();
    sectors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, gdp: &str) -> RawRecord {
        RawRecord {
            name: name.into(),
            sector: "Energy".into(),
            region: "Europe".into(),
            change: "15.0%".into(),
            gdp_impact: gdp.into(),
            inflation_impact: "0.30pp".into(),
            unemployment_impact: "-0.20pp".into(),
        }
    }

    #[test]
    fn row_derives_typed_values_from_text() {
        let row = PolicyRow::from_record(&record("Solar Tax Credit", "1.23%"));
        assert_eq!(row.change, 15.0);
        assert_eq!(row.gdp_impact, 1.23);
        assert_eq!(row.inflation_impact, 0.3);
        assert_eq!(row.unemployment_impact, -0.2);
        assert_eq!(row.cell(ColumnId::GdpImpact), "1.23%");
        assert_eq!(row.cell(ColumnId::InflationImpact), "0.30pp");
        assert_eq!(row.name_lower(), "solar tax credit");
    }

    #[test]
    fn malformed_numbers_become_zero() {
        let row = PolicyRow::from_record(&record("Broken", "n/a"));
        assert_eq!(row.gdp_impact, 0.0);
        assert_eq!(row.cell(ColumnId::GdpImpact), "0.00%");
    }

    #[test]
    fn sectors_are_distinct_and_sorted() {
        let mut records = vec![record("A", "1%"), record("B", "2%")];
        records[1].sector = "Agriculture".into();
        let rows = build_rows(&records);
        assert_eq!(sector_values(&rows), vec!["Agriculture", "Energy"]);
    }

    #[test]
    fn details_column_is_not_sortable() {
        assert!(!ColumnId::Details.sortable());
        assert!(ColumnId::ALL[..COLUMN_COUNT - 1].iter().all(|c| c.sortable()));
    }
}
