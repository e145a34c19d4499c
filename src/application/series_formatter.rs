// Series formatter - turns raw samples into display-ready chart points
use crate::domain::series::{FormattedSample, RawSample};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Day/month/2-digit-year, e.g. `5/3/24`
const DISPLAY_FORMAT: &str = "%-d/%-m/%y";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Format every sample, keeping length and order. Malformed points degrade
/// to an empty date and/or a zero value instead of failing the series.
pub fn format_series(samples: &[RawSample]) -> Vec<FormattedSample> {
    samples
        .iter()
        .map(|s| FormattedSample::new(format_date(&s.date), coerce_value(s.value)))
        .collect()
}

/// Render a source date for display, or `""` when it cannot be parsed
pub fn format_date(raw: &str) -> String {
    parse_date(raw.trim())
        .map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        })
}

fn coerce_value(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
