//! Synthetic demo dataset
//!
//! Used when the configured sources cannot be read. Values are drawn from a
//! seeded normal distribution and clipped to a plausible range, so the same
//! `now` always yields the same dataset.

use chrono::{Duration, NaiveDateTime};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use tracing::debug;

use crate::models::{Attribute, Source};
use crate::normalize::{RawRow, RawValue, HISTORICAL_WINDOW_DAYS};

/// Seed for the demo generator
pub const SAMPLE_SEED: u64 = 42;

/// Days of hourly predictions generated
pub const PREDICTED_WINDOW_DAYS: i64 = 90;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Distribution of one attribute for one source
#[derive(Debug, Clone, Copy)]
struct Profile {
    attribute: Attribute,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

const fn profile(attribute: Attribute, mean: f64, std_dev: f64, min: f64, max: f64) -> Profile {
    Profile {
        attribute,
        mean,
        std_dev,
        min,
        max,
    }
}

const HISTORICAL_PROFILES: [Profile; 4] = [
    profile(Attribute::StressIndex, 50.0, 15.0, 0.0, 100.0),
    profile(Attribute::HeartRate, 75.0, 10.0, 50.0, 120.0),
    profile(Attribute::SystolicBP, 120.0, 15.0, 90.0, 180.0),
    profile(Attribute::DiastolicBP, 80.0, 10.0, 60.0, 120.0),
];

const PREDICTED_PROFILES: [Profile; 4] = [
    profile(Attribute::StressIndex, 55.0, 12.0, 0.0, 100.0),
    profile(Attribute::HeartRate, 78.0, 8.0, 50.0, 120.0),
    profile(Attribute::SystolicBP, 125.0, 12.0, 90.0, 180.0),
    profile(Attribute::DiastolicBP, 82.0, 8.0, 60.0, 120.0),
];

/// Raw rows for both sources, ready for normalization
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub historical: Vec<RawRow>,
    pub predicted: Vec<RawRow>,
}

impl SyntheticDataset {
    pub fn rows(&self, source: Source) -> &[RawRow] {
        match source {
            Source::Historical => &self.historical,
            Source::Predicted => &self.predicted,
        }
    }
}

impl Profile {
    /// Normal distribution for this profile, `None` for a non-positive spread
    fn distribution(&self) -> Option<Normal> {
        Normal::new(self.mean, self.std_dev).ok()
    }

    /// One clipped draw; a profile without a valid distribution yields its mean
    fn draw(&self, normal: Option<&Normal>, rng: &mut StdRng) -> f64 {
        normal
            .map_or(self.mean, |n| n.sample(rng))
            .clamp(self.min, self.max)
    }
}

fn generate_rows(
    rng: &mut StdRng,
    start: NaiveDateTime,
    hours: i64,
    profiles: &[Profile],
) -> Vec<RawRow> {
    let distributions: Vec<Option<Normal>> = profiles.iter().map(Profile::distribution).collect();

    (0..hours)
        .map(|hour| {
            let timestamp = start + Duration::hours(hour);
            let mut row = RawRow::new();
            row.insert(
                "datetime".to_string(),
                RawValue::Text(timestamp.format(DATETIME_FORMAT).to_string()),
            );
            for (p, normal) in profiles.iter().zip(&distributions) {
                let value = p.draw(normal.as_ref(), rng);
                row.insert(p.attribute.column().to_string(), RawValue::Number(value));
            }
            row
        })
        .collect()
}

/// Hourly history for the 180 days before `now` and hourly predictions for
/// the 90 days from `now`
pub fn synthetic_dataset(now: NaiveDateTime) -> SyntheticDataset {
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);

    let historical = generate_rows(
        &mut rng,
        now - Duration::days(HISTORICAL_WINDOW_DAYS),
        HISTORICAL_WINDOW_DAYS * 24,
        &HISTORICAL_PROFILES,
    );
    let predicted = generate_rows(&mut rng, now, PREDICTED_WINDOW_DAYS * 24, &PREDICTED_PROFILES);

    debug!(
        historical = historical.len(),
        predicted = predicted.len(),
        "Generated synthetic dataset"
    );
    SyntheticDataset {
        historical,
        predicted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_rows;
    use crate::stats::mean;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-01 12:00:00", DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_dataset_shape() {
        let dataset = synthetic_dataset(now());
        assert_eq!(dataset.historical.len(), 180 * 24);
        assert_eq!(dataset.predicted.len(), 90 * 24);

        let first = &dataset.historical[0];
        assert_eq!(
            first["datetime"],
            RawValue::Text("2023-12-04 12:00:00".into())
        );
        assert_eq!(
            dataset.rows(Source::Predicted)[0]["datetime"],
            RawValue::Text("2024-06-01 12:00:00".into())
        );
    }

    #[test]
    fn test_deterministic_for_same_now() {
        assert_eq!(synthetic_dataset(now()), synthetic_dataset(now()));
    }

    #[test]
    fn test_values_clipped_and_centered() {
        let dataset = synthetic_dataset(now());
        let records = normalize_rows(&dataset.historical, Source::Historical, now());

        let stress: Vec<f64> = records
            .iter()
            .filter_map(|r| r.value(Attribute::StressIndex))
            .collect();
        assert_eq!(stress.len(), records.len());
        assert!(stress.iter().all(|v| (0.0..=100.0).contains(v)));

        let avg = mean(&stress).unwrap();
        assert!((avg - 50.0).abs() < 2.0, "mean was {avg}");

        let heart_rate: Vec<f64> = records
            .iter()
            .filter_map(|r| r.value(Attribute::HeartRate))
            .collect();
        assert!(heart_rate.iter().all(|v| (50.0..=120.0).contains(v)));
    }

    #[test]
    fn test_profiles_build_normal_distributions() {
        for p in HISTORICAL_PROFILES.iter().chain(PREDICTED_PROFILES.iter()) {
            assert!(p.distribution().is_some(), "{:?}", p.attribute);
        }
    }

    #[test]
    fn test_zero_spread_profile_yields_clipped_mean() {
        let flat = profile(Attribute::HeartRate, 130.0, 0.0, 50.0, 120.0);
        assert!(flat.distribution().is_none());

        let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
        assert_eq!(flat.draw(None, &mut rng), 120.0);
    }

    #[test]
    fn test_predicted_values_follow_predicted_profile() {
        let dataset = synthetic_dataset(now());
        let records = normalize_rows(&dataset.predicted, Source::Predicted, now());
        let systolic: Vec<f64> = records
            .iter()
            .filter_map(|r| r.value(Attribute::SystolicBP))
            .collect();

        assert!(systolic.iter().all(|v| (90.0..=180.0).contains(v)));
        let avg = mean(&systolic).unwrap();
        assert!((avg - 125.0).abs() < 2.0, "mean was {avg}");
    }

    #[test]
    fn test_rows_carry_parseable_timestamps() {
        let dataset = synthetic_dataset(now());
        let records = normalize_rows(&dataset.predicted, Source::Predicted, now());
        assert_eq!(records[0].timestamp, now());
        assert_eq!(records[1].timestamp, now() + Duration::hours(1));
    }
}
