// Stats derivation - summary figures for the metric cards
use crate::domain::metric::ValueKind;
use crate::domain::series::{FormattedSample, MetricStats};

/// Derive card statistics from a formatted series.
///
/// Measurement metrics compare the last reading against the first one.
/// Cumulative metrics report the period total (the server's figure when it
/// sent one) and the rounded daily average as both `current` and `previous`,
/// since a single fetch never covers an earlier period to compare with.
pub fn derive_stats(
    series: &[FormattedSample],
    kind: ValueKind,
    server_total: Option<f64>,
) -> MetricStats {
    match kind {
        ValueKind::Measurement => measurement_stats(series),
        ValueKind::Cumulative => cumulative_stats(series, server_total),
    }
}

fn measurement_stats(series: &[FormattedSample]) -> MetricStats {
    let current = series.last().map(|s| s.value).unwrap_or(0.0);
    let previous = series.first().map(|s| s.value).unwrap_or(0.0);
    MetricStats::new(current, previous, None)
}

fn cumulative_stats(series: &[FormattedSample], server_total: Option<f64>) -> MetricStats {
    if series.is_empty() {
        return MetricStats::new(0.0, 0.0, Some(0.0));
    }

    let total = server_total
        .filter(|t| t.is_finite())
        .unwrap_or_else(|| series.iter().map(|s| s.value).sum());
    let daily_average = daily_average(total, series.len());

    MetricStats::new(daily_average, daily_average, Some(total))
}

fn daily_average(total: f64, days: usize) -> f64 {
    (total / days.max(1) as f64).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<FormattedSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| FormattedSample::new(format!("{}/3/24", i + 1), *v))
            .collect()
    }

    #[test]
    fn test_measurement_last_vs_first() {
        let stats = derive_stats(&series(&[70.0, 68.0, 65.0]), ValueKind::Measurement, None);
        assert_eq!(stats.current, 65.0);
        assert_eq!(stats.previous, 70.0);
        assert_eq!(stats.total, None);
        assert!((stats.change_percent() - (-7.14)).abs() < 0.01);
    }

    #[test]
    fn test_measurement_ignores_server_total() {
        let stats = derive_stats(&series(&[80.0]), ValueKind::Measurement, Some(500.0));
        assert_eq!(stats, MetricStats::new(80.0, 80.0, None));
    }

    #[test]
    fn test_cumulative_uses_server_total() {
        let stats = derive_stats(&series(&[1000.0; 7]), ValueKind::Cumulative, Some(14000.0));
        assert_eq!(stats.current, 2000.0);
        assert_eq!(stats.previous, 2000.0);
        assert_eq!(stats.total, Some(14000.0));
    }

    #[test]
    fn test_cumulative_sums_without_server_total() {
        let stats = derive_stats(&series(&[3.0, 4.0, 4.0]), ValueKind::Cumulative, None);
        assert_eq!(stats.total, Some(11.0));
        // 11 / 3 = 3.67
        assert_eq!(stats.current, 4.0);
        assert_eq!(stats.previous, stats.current);
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        let measurement = derive_stats(&[], ValueKind::Measurement, None);
        assert_eq!(measurement, MetricStats::new(0.0, 0.0, None));
        assert_eq!(measurement.change_percent(), 0.0);

        let cumulative = derive_stats(&[], ValueKind::Cumulative, Some(300.0));
        assert_eq!(cumulative, MetricStats::new(0.0, 0.0, Some(0.0)));
    }
}
