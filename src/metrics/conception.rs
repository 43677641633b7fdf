//! Conception rate: births ten months ahead, attributed to the conception month

use super::{safe_ratio, RATE_SCALE};
use crate::series::EntitySeries;

/// Months between conception and the birth attributed to it
pub const CONCEPTION_LAG_MONTHS: i64 = 10;

/// Fill the `future_*` fields and `daily_conception_rate`.
///
/// The rate divides births-per-day at `M+10` by the population at `M`. The
/// last ten months of a series have no counterpart and stay `None`, as does any
/// earlier month whose counterpart has no births.
pub fn apply_conception_rates(series: &mut EntitySeries) {
    let future: Vec<Option<(Option<f64>, u32)>> = series
        .records
        .iter()
        .map(|r| {
            series
                .get(r.key().shift(CONCEPTION_LAG_MONTHS))
                .map(|f| (f.births, f.days_in_month))
        })
        .collect();

    for (record, ahead) in series.records.iter_mut().zip(future) {
        let Some((births, days)) = ahead else {
            record.future_births = None;
            record.future_days_in_month = None;
            record.future_births_per_day = None;
            record.daily_conception_rate = None;
            continue;
        };
        record.future_births = births;
        record.future_days_in_month = Some(days);
        record.future_births_per_day = safe_ratio(births, Some(days as f64));
        record.daily_conception_rate =
            safe_ratio(record.future_births_per_day, record.childbearing_population).map(|r| r * RATE_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthKey;
    use crate::metrics::apply_fertility_rates;
    use crate::series::{build_monthly_index, interpolate_population, PopulationSpan};
    use crate::testing::{flat_births, flat_population, sample_births, sample_population};
    use approx::assert_abs_diff_eq;

    fn derived() -> Vec<EntitySeries> {
        let mut series = build_monthly_index(&sample_births()).unwrap();
        let population = interpolate_population(&sample_population(), PopulationSpan::CalendarYears).unwrap();
        for s in series.iter_mut() {
            apply_fertility_rates(s, population.iter().find(|p| p.entity == s.entity));
            apply_conception_rates(s);
        }
        series
    }

    #[test]
    fn test_january_conceives_november() {
        let series = derived();
        let france = &series[0];
        let jan = france.get(MonthKey::new(2020, 1)).unwrap();
        let nov = france.get(MonthKey::new(2020, 11)).unwrap();

        assert_eq!(jan.future_births, nov.births);
        assert_eq!(jan.future_births, Some(58000.0));
        assert_eq!(jan.future_days_in_month, Some(30));
        assert_abs_diff_eq!(
            jan.daily_conception_rate.unwrap(),
            (58000.0 / 30.0) / 8_500_000.0 * RATE_SCALE,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lag_crosses_year_boundary() {
        let series = derived();
        let france = &series[0];
        let apr = france.get(MonthKey::new(2020, 4)).unwrap();
        let feb = france.get(MonthKey::new(2021, 2)).unwrap();
        assert_eq!(apr.future_births, feb.births);
        assert_eq!(apr.future_days_in_month, Some(28));
    }

    #[test]
    fn test_last_ten_months_are_null() {
        for entity in derived() {
            let n = entity.records.len();
            assert!(entity.records[n - 10..].iter().all(|r| r.daily_conception_rate.is_none()
                && r.future_births.is_none()
                && r.future_days_in_month.is_none()));
            assert!(entity.records[..n - 10].iter().all(|r| r.daily_conception_rate.is_some()));
            assert!(entity
                .records
                .iter()
                .all(|r| r.daily_conception_rate.map_or(true, |v| v >= 0.0)));
        }
    }

    #[test]
    fn test_missing_future_births_nulls_earlier_rows() {
        let mut rows = flat_births("Chile", 3, 500.0);
        rows.retain(|o| !(o.year == 2001 && o.month == 3));
        let mut series = build_monthly_index(&rows).unwrap();
        let population =
            interpolate_population(&flat_population("Chile", 3, 3e6), PopulationSpan::ObservedMonths).unwrap();
        let chile = &mut series[0];
        apply_fertility_rates(chile, population.first());
        apply_conception_rates(chile);

        let may = chile.get(MonthKey::new(2000, 5)).unwrap();
        assert_eq!(may.future_births, None);
        assert_eq!(may.future_days_in_month, Some(31));
        assert_eq!(may.future_births_per_day, None);
        assert_eq!(may.daily_conception_rate, None);

        let june = chile.get(MonthKey::new(2000, 6)).unwrap();
        assert!(june.daily_conception_rate.is_some());

        let n = chile.records.len();
        assert!(chile.records[n - 10..].iter().all(|r| r.daily_conception_rate.is_none()));
    }

    #[test]
    fn test_short_series_has_no_conception() {
        let rows = vec![crate::observation::RawObservation::new("Malta", 2020, 5, Some(350.0), "UN")];
        let mut series = build_monthly_index(&rows).unwrap();
        apply_conception_rates(&mut series[0]);
        assert_eq!(series[0].records[0].daily_conception_rate, None);
    }
}
