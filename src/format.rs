//! Display text <-> typed value conversions. Malformed numeric text is
//! always treated as zero, the data originates from a display layer.

/// Known unit suffixes carried by numeric cells.
pub const UNITS: [&str; 2] = ["pp", "%"];

/// Strip the given unit suffix if present and parse the rest as a decimal
/// number. Returns 0.0 when the text does not parse, never an error.
pub fn parse_number(text: &str, unit: &str) -> f64 {
    let trimmed = text.trim();
    let stripped = trimmed.strip_suffix(unit).unwrap_or(trimmed).trim_end();
    stripped
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Lenient cell parse used by the sort comparator: trims, tolerates a
/// leading '+', strips a known unit suffix, then requires the full rest
/// to be a number.
pub fn parse_cell(text: &str) -> Option<f64> {
    let mut t = text.trim();
    t = t.strip_prefix('+').unwrap_or(t);
    for unit in UNITS {
        if let Some(stripped) = t.strip_suffix(unit) {
            t = stripped.trim_end();
            break;
        }
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// US dollar convention, 2 decimals, thousands grouping.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// Drop everything outside word characters and whitespace. Used for
/// export headers and chart labels.
pub fn strip_symbols(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}
