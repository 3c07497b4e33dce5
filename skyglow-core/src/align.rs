use chrono::{DateTime, TimeZone};

use crate::{
    error::{ForecastError, Result},
    model::{AtmosphericSample, HourlySeries},
};

/// Furthest a sample may sit from the event it is used to score.
const MAX_SAMPLE_GAP_MS: i64 = 60 * 60 * 1000;

/// Index of the hourly sample closest to `target`.
///
/// Ties keep the earlier index.
pub fn nearest_index<Tz: TimeZone>(series: &HourlySeries, target: &DateTime<Tz>) -> Result<usize> {
    let target_ms = target.timestamp_millis();

    let mut best: Option<(usize, i64)> = None;
    for (index, time) in series.times.iter().enumerate() {
        let diff = (time.timestamp_millis() - target_ms).abs();
        match best {
            Some((_, min_diff)) if diff >= min_diff => {}
            _ => best = Some((index, diff)),
        }
    }

    best.map(|(index, _)| index).ok_or(ForecastError::EmptySeries)
}

/// Readings of the hourly sample closest to `target`, with best-case defaults
/// for anything upstream left out.
///
/// Fails with [`ForecastError::NoNearbySample`] when the series does not
/// reach within an hour of `target`.
pub fn sample_at<Tz: TimeZone>(
    series: &HourlySeries,
    target: &DateTime<Tz>,
) -> Result<AtmosphericSample>
where
    Tz::Offset: std::fmt::Display,
{
    let index = nearest_index(series, target)?;
    let gap = (series.times[index].timestamp_millis() - target.timestamp_millis()).abs();
    if gap > MAX_SAMPLE_GAP_MS {
        return Err(ForecastError::NoNearbySample(target.to_rfc3339()));
    }
    let defaults = AtmosphericSample::default();
    let pick = |values: &[Option<f64>], fallback: f64| {
        values.get(index).copied().flatten().unwrap_or(fallback)
    };

    Ok(AtmosphericSample {
        cloud_cover_pct: pick(&series.cloud_cover, defaults.cloud_cover_pct),
        precipitation_probability_pct: pick(
            &series.precipitation_probability,
            defaults.precipitation_probability_pct,
        ),
        humidity_pct: pick(&series.relative_humidity, defaults.humidity_pct),
        visibility_m: pick(&series.visibility, defaults.visibility_m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn series(times: &[&str]) -> HourlySeries {
        let n = times.len();
        HourlySeries {
            timezone: "GMT".into(),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            times: times.iter().map(|t| DateTime::parse_from_rfc3339(t).unwrap()).collect(),
            cloud_cover: (0..n).map(|i| Some(i as f64 * 10.0)).collect(),
            precipitation_probability: vec![Some(5.0); n],
            relative_humidity: vec![Some(80.0); n],
            visibility: vec![Some(20_000.0); n],
        }
    }

    fn three_hours() -> HourlySeries {
        series(&["2024-06-21T08:00:00Z", "2024-06-21T09:00:00Z", "2024-06-21T10:00:00Z"])
    }

    fn target(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn picks_nearest_hour() {
        let s = three_hours();
        assert_eq!(nearest_index(&s, &target("2024-06-21T09:29:00Z")).unwrap(), 1);
        assert_eq!(nearest_index(&s, &target("2024-06-21T09:31:00Z")).unwrap(), 2);
    }

    #[test]
    fn tie_keeps_earlier_index() {
        let s = three_hours();
        assert_eq!(nearest_index(&s, &target("2024-06-21T09:30:00Z")).unwrap(), 1);
        assert_eq!(nearest_index(&s, &target("2024-06-21T08:30:00Z")).unwrap(), 0);
    }

    #[test]
    fn targets_outside_range_clamp_to_edges() {
        let s = three_hours();
        assert_eq!(nearest_index(&s, &target("2024-06-20T23:00:00Z")).unwrap(), 0);
        assert_eq!(nearest_index(&s, &target("2024-06-22T23:00:00Z")).unwrap(), 2);
    }

    #[test]
    fn compares_absolute_instants_across_offsets() {
        let s = three_hours();
        // 11:10+02:00 is 09:10Z
        let t = DateTime::parse_from_rfc3339("2024-06-21T11:10:00+02:00").unwrap();
        assert_eq!(nearest_index(&s, &t).unwrap(), 1);
    }

    #[test]
    fn empty_series_is_an_error() {
        let s = series(&[]);
        let err = sample_at(&s, &target("2024-06-21T09:00:00Z")).unwrap_err();
        assert!(matches!(err, ForecastError::EmptySeries));
    }

    #[test]
    fn sample_reads_aligned_index() {
        let s = three_hours();
        let sample = sample_at(&s, &target("2024-06-21T10:05:00Z")).unwrap();
        assert_eq!(sample.cloud_cover_pct, 20.0);
        assert_eq!(sample.precipitation_probability_pct, 5.0);
        assert_eq!(sample.humidity_pct, 80.0);
        assert_eq!(sample.visibility_m, 20_000.0);
    }

    #[test]
    fn missing_readings_use_defaults() {
        let mut s = three_hours();
        s.cloud_cover[1] = None;
        s.visibility[1] = None;
        s.relative_humidity.truncate(1);
        s.precipitation_probability.clear();

        let sample = sample_at(&s, &target("2024-06-21T09:00:00Z")).unwrap();
        assert_eq!(sample, AtmosphericSample::default());
    }

    #[test]
    fn sample_an_hour_away_is_accepted() {
        let s = three_hours();
        let sample = sample_at(&s, &target("2024-06-21T11:00:00Z")).unwrap();
        assert_eq!(sample.cloud_cover_pct, 20.0);
    }

    #[test]
    fn distant_target_is_rejected() {
        let s = three_hours();
        let err = sample_at(&s, &target("2024-06-21T11:01:00Z")).unwrap_err();
        assert!(matches!(err, ForecastError::NoNearbySample(_)));

        let err = sample_at(&s, &target("1970-01-01T00:00:01Z")).unwrap_err();
        assert!(err.to_string().contains("1970-01-01T00:00:01"));
    }
}
