// src/grid/codec.rs
//
// Cell value codec for the editable grid: stored numeric value → display
// string on render, typed string → stored numeric value on edit commit.
// Stored cell values are JSON values, so a cell that was never numeric
// passes through formatting unchanged instead of being mangled to "NaN".

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

static PERCENT_GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\d{1,3}(,\d{3})*(\.\d+)?%$").expect("invalid grouped percent regex")
});
static PERCENT_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d*(\.\d+)?%$").expect("invalid plain percent regex"));
static PERCENT_NO_INTEGRAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\.\d+%$").expect("invalid fractional percent regex"));
static NUMBER_GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\$?\d{1,3}(,\d{3})*(\.\d+)?$").expect("invalid grouped number regex")
});
static NUMBER_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\$?\d*(\.\d+)?$").expect("invalid plain number regex"));

/// Column value families. The digit suffix is the rendered decimal
/// precision; `Dollars*` adds a currency prefix, `Percent*` renders the
/// stored fraction scaled by 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Number0,
    Number2,
    Number3,
    Dollars,
    DollarsAndCents,
    Percent1,
    Percent2,
    Percent3,
    Date,
}

impl ColumnType {
    fn decimals(self) -> u32 {
        match self {
            ColumnType::Number0 | ColumnType::Dollars => 0,
            ColumnType::Number2 | ColumnType::DollarsAndCents => 2,
            ColumnType::Number3 => 3,
            ColumnType::Percent1 => 1,
            ColumnType::Percent2 => 2,
            ColumnType::Percent3 => 3,
            ColumnType::Date => 0,
        }
    }
}

/// Render a stored value for display. Nulls stay null and non-numeric
/// stored values come back unchanged; only genuinely numeric values are
/// formatted.
pub fn format_cell(ty: ColumnType, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    if ty == ColumnType::Date {
        return format_date(value);
    }
    let Some(n) = numeric(value) else {
        return value.clone();
    };
    let text = match ty {
        ColumnType::Dollars | ColumnType::DollarsAndCents => render(n, ty.decimals(), "$", ""),
        ColumnType::Percent1 | ColumnType::Percent2 | ColumnType::Percent3 => {
            render(n * 100.0, ty.decimals(), "", "%")
        }
        _ => render(n, ty.decimals(), "", ""),
    };
    Value::String(text)
}

/// Parse a typed string back to a stored number. May return NaN; the
/// commit step (`set_cell`) is the gate that keeps NaN out of the row.
pub fn parse_cell(ty: ColumnType, input: &str) -> f64 {
    match ty {
        ColumnType::Percent1 | ColumnType::Percent2 | ColumnType::Percent3 => {
            parse_percent(input)
        }
        ColumnType::Date => coerce(input),
        _ => parse_currency(input),
    }
}

/// Commit an edit. A NaN parse leaves the row untouched and reports the
/// rejection; this is the sole validation protecting the data model from
/// corrupt numeric input.
pub fn set_cell(row: &mut Map<String, Value>, col: &str, parsed: f64) -> bool {
    if parsed.is_nan() {
        return false;
    }
    let Some(n) = Number::from_f64(parsed) else {
        return false;
    };
    row.insert(col.to_string(), Value::Number(n));
    true
}

fn parse_currency(input: &str) -> f64 {
    if NUMBER_GROUPED.is_match(input) {
        coerce(&input.replace(',', "").replace('$', ""))
    } else if NUMBER_PLAIN.is_match(input) {
        coerce(&input.replace('$', ""))
    } else {
        coerce(input)
    }
}

fn parse_percent(input: &str) -> f64 {
    // All three shapes tried in order, first match wins.
    if PERCENT_GROUPED.is_match(input) {
        coerce(&input.replace(',', "").replace('%', "")) / 100.0
    } else if PERCENT_PLAIN.is_match(input) || PERCENT_NO_INTEGRAL.is_match(input) {
        coerce(&input.replace('%', "")) / 100.0
    } else {
        coerce(input)
    }
}

/// Numeric coercion with the semantics the grid's editors expect: a
/// trimmed-empty string is zero, anything unparseable is NaN.
fn coerce(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse().unwrap_or(f64::NAN)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let n = coerce(s);
            (!n.is_nan()).then_some(n)
        }
        _ => None,
    }
}

/// Fixed-precision, comma-grouped rendering with half-up rounding. The
/// sign precedes the currency prefix (`-$1,234.50`).
fn render(n: f64, decimals: u32, prefix: &str, suffix: &str) -> String {
    let factor = 10u128.pow(decimals);
    let scaled = (n.abs() * factor as f64).round() as u128;
    let negative = n < 0.0 && scaled != 0;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(prefix);
    out.push_str(&group_thousands(scaled / factor));
    if decimals > 0 {
        out.push('.');
        out.push_str(&format!("{:0width$}", scaled % factor, width = decimals as usize));
    }
    out.push_str(suffix);
    out
}

fn group_thousands(v: u128) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO `2024-01-05` → `1/5/2024`. Datetime strings are trimmed to their
/// date part; anything unparseable passes through unchanged.
fn format_date(value: &Value) -> Value {
    let Some(s) = value.as_str() else {
        return value.clone();
    };
    let date_part = s.get(..10).unwrap_or(s);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(d) => Value::String(d.format("%-m/%-d/%Y").to_string()),
        Err(_) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_parse_strips_grouping_and_dollar_sign() {
        assert_eq!(parse_cell(ColumnType::DollarsAndCents, "1,234.50"), 1234.5);
        assert_eq!(parse_cell(ColumnType::Dollars, "$1,234"), 1234.0);
        assert_eq!(parse_cell(ColumnType::Dollars, "-$1,234,567.89"), -1234567.89);
        assert_eq!(parse_cell(ColumnType::Number2, "12.5"), 12.5);
    }

    #[test]
    fn percent_parse_divides_by_one_hundred() {
        assert_eq!(parse_cell(ColumnType::Percent1, "12.5%"), 0.125);
        assert_eq!(parse_cell(ColumnType::Percent3, ".5%"), 0.005);
        assert_eq!(parse_cell(ColumnType::Percent2, "-3%"), -0.03);
        assert_eq!(parse_cell(ColumnType::Percent1, "-12.5%"), -0.125);
        assert_eq!(parse_cell(ColumnType::Percent2, "1,200%"), 12.0);
        // already a fraction, no percent sign: no division
        assert_eq!(parse_cell(ColumnType::Percent2, "0.5"), 0.5);
    }

    #[test]
    fn malformed_input_parses_to_nan() {
        assert!(parse_cell(ColumnType::Dollars, "abc").is_nan());
        assert!(parse_cell(ColumnType::Dollars, "-").is_nan());
        assert!(parse_cell(ColumnType::Dollars, "1.2.3").is_nan());
        assert!(parse_cell(ColumnType::Percent2, "12%%").is_nan());
    }

    #[test]
    fn degenerate_inputs_coerce_to_zero() {
        // the editors' semantics: an empty numeric part coerces to 0, so
        // "", "$" and even a bare "%" all commit as 0
        assert_eq!(parse_cell(ColumnType::Dollars, ""), 0.0);
        assert_eq!(parse_cell(ColumnType::Dollars, "$"), 0.0);
        assert_eq!(parse_cell(ColumnType::Percent1, "%"), 0.0);
    }

    #[test]
    fn setter_rejects_nan_and_keeps_prior_value() {
        let mut row = json!({"diff": 10.0}).as_object().unwrap().clone();
        let parsed = parse_cell(ColumnType::DollarsAndCents, "abc");
        assert!(!set_cell(&mut row, "diff", parsed));
        assert_eq!(row["diff"], json!(10.0));

        let parsed = parse_cell(ColumnType::DollarsAndCents, "$1,250.75");
        assert!(set_cell(&mut row, "diff", parsed));
        assert_eq!(row["diff"], json!(1250.75));
    }

    #[test]
    fn format_groups_and_fixes_precision() {
        assert_eq!(
            format_cell(ColumnType::Number0, &json!(1234567.0)),
            json!("1,234,567")
        );
        assert_eq!(
            format_cell(ColumnType::Number2, &json!(1234.5)),
            json!("1,234.50")
        );
        assert_eq!(
            format_cell(ColumnType::Number3, &json!(0.1)),
            json!("0.100")
        );
        // half-up at the requested precision
        assert_eq!(format_cell(ColumnType::Number0, &json!(1234.56)), json!("1,235"));
    }

    #[test]
    fn format_currency_puts_sign_before_dollar() {
        assert_eq!(
            format_cell(ColumnType::DollarsAndCents, &json!(1234.5)),
            json!("$1,234.50")
        );
        assert_eq!(format_cell(ColumnType::Dollars, &json!(-1234.0)), json!("-$1,234"));
    }

    #[test]
    fn format_percent_scales_stored_fraction() {
        assert_eq!(format_cell(ColumnType::Percent1, &json!(0.125)), json!("12.5%"));
        assert_eq!(format_cell(ColumnType::Percent2, &json!(-0.03)), json!("-3.00%"));
    }

    #[test]
    fn format_passes_null_and_non_numeric_through() {
        assert_eq!(format_cell(ColumnType::Dollars, &Value::Null), Value::Null);
        assert_eq!(
            format_cell(ColumnType::Dollars, &json!("n/a")),
            json!("n/a")
        );
        // numeric strings still format
        assert_eq!(format_cell(ColumnType::Dollars, &json!("1200")), json!("$1,200"));
    }

    #[test]
    fn format_date_renders_locale_style() {
        assert_eq!(format_cell(ColumnType::Date, &json!("2024-01-05")), json!("1/5/2024"));
        assert_eq!(
            format_cell(ColumnType::Date, &json!("2024-11-30T00:00:00")),
            json!("11/30/2024")
        );
        assert_eq!(format_cell(ColumnType::Date, &Value::Null), Value::Null);
        assert_eq!(
            format_cell(ColumnType::Date, &json!("not-a-date")),
            json!("not-a-date")
        );
        // multibyte input must pass through rather than split mid-character
        assert_eq!(
            format_cell(ColumnType::Date, &json!("aaaaaaaaa日")),
            json!("aaaaaaaaa日")
        );
        assert_eq!(
            format_cell(ColumnType::Date, &json!("生年月日")),
            json!("生年月日")
        );
    }

    #[test]
    fn currency_round_trips_through_format_and_parse() {
        for s in ["$1,234.50", "1,234,567.89", "-$12.25", "0.75"] {
            let parsed = parse_cell(ColumnType::DollarsAndCents, s);
            let shown = format_cell(ColumnType::DollarsAndCents, &json!(parsed));
            let reparsed = parse_cell(ColumnType::DollarsAndCents, shown.as_str().unwrap());
            assert_eq!(parsed, reparsed, "round-trip failed for {s}");
        }
    }
}
