//! Sky quality scoring.
//!
//! Linear penalties on a base of 100:
//! - cloud cover: 0.6 per percent
//! - precipitation probability: 0.8 per percent
//! - humidity above 70%: 0.3 per percent over
//! - visibility below 10 km: 0.2 per 100 m short

use crate::model::{AtmosphericSample, SkyLabel, SkyQualityScore};

const CLOUD_COVER_WEIGHT: f64 = 0.6;
const PRECIPITATION_WEIGHT: f64 = 0.8;
const HUMIDITY_THRESHOLD_PCT: f64 = 70.0;
const HUMIDITY_WEIGHT: f64 = 0.3;
const VISIBILITY_THRESHOLD_M: f64 = 10_000.0;
const VISIBILITY_WEIGHT_PER_100M: f64 = 0.2;

pub fn score_sky(sample: &AtmosphericSample) -> SkyQualityScore {
    let raw = raw_score(sample);
    let label = SkyLabel::from_score(raw);

    SkyQualityScore {
        // `raw` is already clamped to [0, 100].
        score: raw.round() as u8,
        label,
        color: label.color().to_string(),
    }
}

/// Clamped score before rounding. Labels are decided on this value.
pub fn raw_score(sample: &AtmosphericSample) -> f64 {
    let cloud = or_default(sample.cloud_cover_pct, 0.0);
    let precip = or_default(sample.precipitation_probability_pct, 0.0);
    let humidity = or_default(sample.humidity_pct, 0.0);
    let visibility = or_default(sample.visibility_m, AtmosphericSample::DEFAULT_VISIBILITY_M);

    let mut score = 100.0;
    score -= cloud * CLOUD_COVER_WEIGHT;
    score -= precip * PRECIPITATION_WEIGHT;

    if humidity > HUMIDITY_THRESHOLD_PCT {
        score -= (humidity - HUMIDITY_THRESHOLD_PCT) * HUMIDITY_WEIGHT;
    }

    if visibility < VISIBILITY_THRESHOLD_M {
        score -= (VISIBILITY_THRESHOLD_M - visibility) / 100.0 * VISIBILITY_WEIGHT_PER_100M;
    }

    score.clamp(0.0, 100.0)
}

// NaN would slip through `clamp` and break the [0, 100] bound.
fn or_default(value: f64, default: f64) -> f64 {
    if value.is_nan() { default } else { value }
}

impl SkyLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            SkyLabel::Great
        } else if score >= 60.0 {
            SkyLabel::Good
        } else if score >= 40.0 {
            SkyLabel::Fair
        } else {
            SkyLabel::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(cloud: f64, precip: f64, humidity: f64, visibility: f64) -> AtmosphericSample {
        AtmosphericSample {
            cloud_cover_pct: cloud,
            precipitation_probability_pct: precip,
            humidity_pct: humidity,
            visibility_m: visibility,
        }
    }

    #[test]
    fn perfect_conditions_score_100() {
        let s = score_sky(&sample(0.0, 0.0, 0.0, 10_000.0));
        assert_eq!(s.score, 100);
        assert_eq!(s.label, SkyLabel::Great);
        assert_eq!(s.color, "#10b981");
    }

    #[test]
    fn worst_conditions_clamp_to_zero() {
        let s = score_sky(&sample(100.0, 100.0, 100.0, 0.0));
        assert_eq!(s.score, 0);
        assert_eq!(s.label, SkyLabel::Poor);
        assert_eq!(s.color, "#ef4444");
    }

    #[test]
    fn out_of_range_inputs_stay_bounded() {
        assert_eq!(score_sky(&sample(-500.0, -500.0, 0.0, 1e9)).score, 100);
        assert_eq!(score_sky(&sample(1e6, 0.0, 0.0, 10_000.0)).score, 0);
    }

    #[test]
    fn nan_readings_fall_back_to_best_case() {
        let s = score_sky(&sample(f64::NAN, f64::NAN, f64::NAN, f64::NAN));
        assert_eq!(s.score, 100);
    }

    #[test]
    fn humidity_penalty_only_above_threshold() {
        assert_eq!(score_sky(&sample(0.0, 0.0, 70.0, 10_000.0)).score, 100);
        // (90 - 70) * 0.3 = 6
        assert_eq!(score_sky(&sample(0.0, 0.0, 90.0, 10_000.0)).score, 94);
    }

    #[test]
    fn visibility_penalty_scales_per_100m() {
        // (10000 - 5000) / 100 * 0.2 = 10
        assert_eq!(score_sky(&sample(0.0, 0.0, 0.0, 5_000.0)).score, 90);
        assert_eq!(score_sky(&sample(0.0, 0.0, 0.0, 24_000.0)).score, 100);
    }

    #[test]
    fn combined_penalties() {
        // 100 - 30 - 16 - 3 - 4 = 47
        let s = score_sky(&sample(50.0, 20.0, 80.0, 8_000.0));
        assert_eq!(s.score, 47);
        assert_eq!(s.label, SkyLabel::Fair);
        assert_eq!(s.color, "#f97316");
    }

    #[test]
    fn label_boundaries() {
        assert_eq!(SkyLabel::from_score(80.0), SkyLabel::Great);
        assert_eq!(SkyLabel::from_score(79.0), SkyLabel::Good);
        assert_eq!(SkyLabel::from_score(60.0), SkyLabel::Good);
        assert_eq!(SkyLabel::from_score(59.0), SkyLabel::Fair);
        assert_eq!(SkyLabel::from_score(40.0), SkyLabel::Fair);
        assert_eq!(SkyLabel::from_score(39.0), SkyLabel::Poor);
    }

    #[test]
    fn label_uses_pre_rounding_score() {
        // 100 - 33.5 * 0.6 = 79.9: rounds to 80 but is still labelled Good.
        let s = score_sky(&sample(33.5, 0.0, 0.0, 10_000.0));
        assert_eq!(s.score, 80);
        assert_eq!(s.label, SkyLabel::Good);
    }

    #[test]
    fn scoring_is_idempotent() {
        let input = sample(42.0, 13.0, 88.0, 7_250.0);
        assert_eq!(score_sky(&input), score_sky(&input));
    }

    proptest! {
        #[test]
        fn score_within_bounds(
            cloud in 0.0f64..=100.0,
            precip in 0.0f64..=100.0,
            humidity in 0.0f64..=100.0,
            visibility in 0.0f64..=100_000.0,
        ) {
            let raw = raw_score(&sample(cloud, precip, humidity, visibility));
            prop_assert!((0.0..=100.0).contains(&raw));
            prop_assert!(score_sky(&sample(cloud, precip, humidity, visibility)).score <= 100);
        }
    }
}
