//! Lunar illumination ephemeris.
//!
//! Illumination fraction is derived from the moon's age within the mean
//! synodic month, measured from a reference new moon (2000-01-06 18:14 UTC,
//! JD 2451550.1). For daily bars the mean-cycle approximation is accurate to
//! well under a day of phase drift over the backtest horizons we care about.

use chrono::{Datelike, NaiveDate};

/// Mean synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530588853;

/// Julian day of the reference new moon.
const NEW_MOON_EPOCH_JD: f64 = 2451550.1;

/// Illumination fraction paired with the date it was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    pub date: NaiveDate,
    pub illumination: f64,
}

impl PhaseSample {
    pub fn on(date: NaiveDate) -> Self {
        PhaseSample {
            date,
            illumination: illumination(date),
        }
    }
}

/// Julian day number for noon UTC on the given calendar date.
fn julian_day(date: NaiveDate) -> f64 {
    // JD 2451545.0 is noon on 2000-01-01; num_days_from_ce anchors at 0001-01-01.
    date.num_days_from_ce() as f64 + 1_721_425.0
}

/// Age of the moon in days since the last new moon, in [0, SYNODIC_MONTH).
pub fn moon_age(date: NaiveDate) -> f64 {
    let age = (julian_day(date) - NEW_MOON_EPOCH_JD) % SYNODIC_MONTH;
    if age < 0.0 { age + SYNODIC_MONTH } else { age }
}

/// Fraction of the moon's visible disk illuminated on the given date, in [0, 1).
///
/// 0 at new moon, rising through 0.5 at first quarter toward full, then
/// falling back. The cosine never quite reaches -1 on whole-day samples, so
/// the value stays below 1.
pub fn illumination(date: NaiveDate) -> f64 {
    let cycle = moon_age(date) / SYNODIC_MONTH;
    (1.0 - (2.0 * std::f64::consts::PI * cycle).cos()) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn julian_day_j2000() {
        assert_relative_eq!(julian_day(date(2000, 1, 1)), 2_451_545.0);
    }

    #[test]
    fn new_moon_near_epoch() {
        // Reference new moon fell on 2000-01-06.
        assert!(illumination(date(2000, 1, 6)) < 0.02);
    }

    #[test]
    fn full_moon_mid_cycle() {
        // 2000-01-21 was a full moon (and a total lunar eclipse).
        assert!(illumination(date(2000, 1, 21)) > 0.97);
    }

    #[test]
    fn known_new_moon_2024() {
        // New moon 2024-01-11.
        assert!(illumination(date(2024, 1, 11)) < 0.05);
    }

    #[test]
    fn known_full_moon_2024() {
        // Full moon 2024-01-25.
        assert!(illumination(date(2024, 1, 25)) > 0.95);
    }

    #[test]
    fn illumination_in_unit_interval() {
        let start = date(2021, 1, 1);
        for offset in 0..1200 {
            let d = start + chrono::Duration::days(offset);
            let f = illumination(d);
            assert!((0.0..1.0).contains(&f), "illumination {} out of range on {}", f, d);
        }
    }

    #[test]
    fn age_wraps_within_cycle() {
        let start = date(2021, 1, 1);
        for offset in 0..120 {
            let d = start + chrono::Duration::days(offset);
            let age = moon_age(d);
            assert!((0.0..SYNODIC_MONTH).contains(&age));
        }
    }

    #[test]
    fn waxing_then_waning_across_cycle() {
        // From a new moon, illumination should rise for roughly half the
        // cycle and fall for the other half.
        let new_moon = date(2024, 1, 11);
        let rising = illumination(new_moon + chrono::Duration::days(5))
            < illumination(new_moon + chrono::Duration::days(10));
        let falling = illumination(new_moon + chrono::Duration::days(18))
            > illumination(new_moon + chrono::Duration::days(23));
        assert!(rising);
        assert!(falling);
    }

    #[test]
    fn phase_sample_matches_function() {
        let d = date(2023, 6, 15);
        let sample = PhaseSample::on(d);
        assert_eq!(sample.date, d);
        assert_relative_eq!(sample.illumination, illumination(d));
    }
}
