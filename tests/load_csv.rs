//! Drives the FileProvider end to end on a CSV fixture and runs the
//! table pipeline (filter, sort, export) over the loaded rows.

use std::path::PathBuf;

use pdash::export::encode_csv;
use pdash::filter::{FilterState, compute_visibility};
use pdash::provider::{DataProvider, FileProvider};
use pdash::rows::{ColumnId, build_rows};
use pdash::sort;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/policies.csv")
}

#[test]
fn loads_all_records_from_csv() {
    let provider = FileProvider::new(fixture()).unwrap();
    assert_eq!(provider.name(), "policies.csv");

    let records = provider.fetch().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].name, "Solar Tax Credit");
    assert_eq!(records[0].gdp_impact, "1.23%");
}

#[test]
fn malformed_numeric_text_loads_as_zero() {
    let records = FileProvider::new(fixture()).unwrap().fetch().unwrap();
    let rows = build_rows(&records);

    let broken = rows.iter().find(|r| r.name == "Broken Numbers Policy").unwrap();
    assert_eq!(broken.change, 0.0);
    assert_eq!(broken.gdp_impact, 0.0);
    assert_eq!(broken.inflation_impact, 0.0);
    assert_eq!(broken.unemployment_impact, 0.0);
}

#[test]
fn filter_sort_export_pipeline() {
    let records = FileProvider::new(fixture()).unwrap().fetch().unwrap();
    let rows = build_rows(&records);
    let mut order: Vec<usize> = (0..rows.len()).collect();

    let mut filter = FilterState::default();
    filter.set_sector("Energy");
    let visibility = compute_visibility(&rows, &filter);
    assert_eq!(visibility.count(), 3);

    sort::apply(&rows, &mut order, ColumnId::GdpImpact, true);
    let csv = encode_csv(&rows, &order, &visibility, &ColumnId::ALL);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Policy Name,"));
    // -0.50 < 0.00 (broken row) < 1.23
    assert!(lines[1].starts_with("\"Carbon Levy\""));
    assert!(lines[2].starts_with("\"Broken Numbers Policy\""));
    assert!(lines[3].starts_with("\"Solar Tax Credit\""));
}

#[test]
fn rejects_unknown_file_types() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    assert!(FileProvider::new(path).is_err());
}
