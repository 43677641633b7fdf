//! Daily fertility rate
//!
//! `births_per_day = Births / days_in_month`
//! `daily_fertility_rate = births_per_day / childbearing_population * 100_000`

use super::{safe_ratio, RATE_SCALE};
use crate::series::{EntitySeries, PopulationSeries};

/// Join population onto the births series and compute per-day rates.
///
/// Months outside the population grid keep a `None` population, so their rate
/// is `None` too. Passing `None` for `population` leaves every rate empty.
pub fn apply_fertility_rates(series: &mut EntitySeries, population: Option<&PopulationSeries>) {
    for record in series.records.iter_mut() {
        if let Some(point) = population.and_then(|p| p.get(record.key())) {
            record.childbearing_population = point.childbearing_population;
            record.population_source = point.source.clone();
            record.population_provenance = point.provenance;
        }

        record.births_per_day = safe_ratio(record.births, Some(record.days_in_month as f64));
        record.daily_fertility_rate =
            safe_ratio(record.births_per_day, record.childbearing_population).map(|r| r * RATE_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthKey;
    use crate::series::{build_monthly_index, interpolate_population, PopulationSpan, Provenance};
    use crate::testing::{sample_births, sample_population};
    use approx::assert_abs_diff_eq;

    fn france() -> EntitySeries {
        let mut births = build_monthly_index(&sample_births()).unwrap();
        let population = interpolate_population(&sample_population(), PopulationSpan::CalendarYears).unwrap();
        let mut france = births.remove(0);
        apply_fertility_rates(&mut france, population.iter().find(|p| p.entity == "France"));
        france
    }

    #[test]
    fn test_january_rate() {
        let france = france();
        let jan = france.get(MonthKey::new(2020, 1)).unwrap();
        assert_abs_diff_eq!(jan.births_per_day.unwrap(), 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            jan.daily_fertility_rate.unwrap(),
            (62000.0 / 31.0) / 8_500_000.0 * 100_000.0,
            epsilon = 1e-9
        );
        assert_eq!(jan.population_provenance, Some(Provenance::Observed));
        assert_eq!(jan.population_source.as_deref(), Some("HMD"));
    }

    #[test]
    fn test_leap_february_uses_29_days() {
        let france = france();
        let feb = france.get(MonthKey::new(2020, 2)).unwrap();
        assert_abs_diff_eq!(feb.births_per_day.unwrap(), 58000.0 / 29.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rates_non_negative() {
        let france = france();
        assert!(france
            .records
            .iter()
            .all(|r| r.daily_fertility_rate.map_or(true, |v| v >= 0.0)));
        assert!(france.records.iter().all(|r| r.daily_fertility_rate.is_some()));
    }

    #[test]
    fn test_missing_or_zero_population_is_null() {
        let mut births = build_monthly_index(&sample_births()).unwrap();
        let mut japan = births.remove(1);
        apply_fertility_rates(&mut japan, None);
        assert!(japan.records.iter().all(|r| r.daily_fertility_rate.is_none()));
        assert!(japan.records.iter().all(|r| r.births_per_day.is_some()));

        let zero = vec![crate::observation::RawObservation::new("Japan", 2020, 1, Some(0.0), "HMD")];
        let population = interpolate_population(&zero, PopulationSpan::CalendarYears).unwrap();
        apply_fertility_rates(&mut japan, population.first());
        let jan = japan.get(MonthKey::new(2020, 1)).unwrap();
        assert_eq!(jan.childbearing_population, Some(0.0));
        assert_eq!(jan.daily_fertility_rate, None);
        // 2021 lies outside the population grid
        assert_eq!(japan.get(MonthKey::new(2021, 1)).unwrap().childbearing_population, None);
    }
}
