use crate::filter::VisibilitySet;
use crate::format::strip_symbols;
use crate::rows::{ColumnId, PolicyRow};

// Characters allowed to survive in an exported field. Quotes and commas
// are among the dropped ones, so fields can be quoted without escaping.
// Not a general CSV encoder.
fn clean_field(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || *c == '_'
                || c.is_whitespace()
                || matches!(c, '-' | '.' | '%')
        })
        .collect()
}

/// Serializes the currently visible rows, in display order, to CSV.
/// The export reflects both the active filter and the active sort. The
/// last entry of `columns` is the controls column and is always
/// dropped. Zero visible rows still produce the header line.
pub fn encode_csv(
    rows: &[PolicyRow],
    order: &[usize],
    visibility: &VisibilitySet,
    columns: &[ColumnId],
) -> String {
    let exported = &columns[..columns.len().saturating_sub(1)];

    let mut csv = Vec::new();
    let header = exported
        .iter()
        .map(|c| strip_symbols(c.display_name()))
        .collect::<Vec<String>>()
        .join(",");
    csv.push(header);

    for &idx in order {
        if !visibility.is_visible(idx) {
            continue;
        }
        let row = &rows[idx];
        let line = exported
            .iter()
            .map(|c| format!("\"{}\"", clean_field(row.cell(*c))))
            .collect::<Vec<String>>()
            .join(",");
        csv.push(line);
    }

    csv.join("\n")
}
