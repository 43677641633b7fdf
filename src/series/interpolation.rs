//! Population interpolation to monthly frequency
//!
//! Census and survey counts arrive annually or at irregular dates. Interior
//! gaps are filled by straight-line interpolation in month-index time; months
//! before the first or after the last known value hold that value. The result
//! never leaves the range spanned by the bracketing observations.

use super::{month_date, PopulationPoint, PopulationSeries, Provenance};
use crate::calendar::MonthKey;
use crate::error::Result;
use crate::observation::{group_by_entity, validate_observations, ObservationKind, RawObservation};
use serde::{Deserialize, Serialize};

/// Extent of the monthly population grid for each entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationSpan {
    /// First observed month through last observed month
    #[default]
    ObservedMonths,
    /// January of the first observed year through December of the last.
    /// Assumes an annual count covers its whole calendar year.
    CalendarYears,
}

impl PopulationSpan {
    fn bounds(&self, first: MonthKey, last: MonthKey) -> (MonthKey, MonthKey) {
        match self {
            PopulationSpan::ObservedMonths => (first, last),
            PopulationSpan::CalendarYears => (MonthKey::new(first.year, 1), MonthKey::new(last.year, 12)),
        }
    }
}

/// Interpolate every entity's population onto a gapless monthly grid.
///
/// Sources are forward- then backward-filled within the entity. Each point's
/// [`Provenance`] records whether the value was observed, interpolated or held.
pub fn interpolate_population(
    observations: &[RawObservation],
    span: PopulationSpan,
) -> Result<Vec<PopulationSeries>> {
    validate_observations(observations, ObservationKind::Population)?;

    let mut out = Vec::new();
    for (entity, rows) in group_by_entity(observations) {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            continue;
        };
        let (start, end) = span.bounds(first.key(), last.key());
        let len = (start.months_until(end) + 1) as usize;

        let mut values: Vec<Option<f64>> = vec![None; len];
        let mut sources: Vec<Option<String>> = vec![None; len];
        for obs in &rows {
            let i = start.months_until(obs.key()) as usize;
            values[i] = obs.value;
            sources[i] = obs.source.clone();
        }

        let (filled, provenance) = fill_linear(&values);
        fill_sources(&mut sources);

        let mut points = Vec::with_capacity(len);
        for (i, key) in start.through(end).enumerate() {
            points.push(PopulationPoint {
                year: key.year,
                month: key.month,
                date: month_date(entity, key)?,
                childbearing_population: filled[i],
                source: sources[i].take(),
                provenance: provenance[i],
            });
        }

        if filled.iter().all(Option::is_none) {
            log::warn!("{}: population rows carry no values; rates will be null", entity);
        }
        log::debug!("{}: {} population months from {} to {}", entity, points.len(), start, end);

        out.push(PopulationSeries {
            entity: entity.to_string(),
            points,
        });
    }

    Ok(out)
}

/// Linear interpolation over interior gaps, nearest-value hold at the edges.
fn fill_linear(values: &[Option<f64>]) -> (Vec<Option<f64>>, Vec<Option<Provenance>>) {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    let mut filled = values.to_vec();
    let mut provenance: Vec<Option<Provenance>> = values
        .iter()
        .map(|v| v.map(|_| Provenance::Observed))
        .collect();

    let (Some(&(first_i, first_v)), Some(&(last_i, last_v))) = (known.first(), known.last()) else {
        return (filled, provenance);
    };

    for i in 0..first_i {
        filled[i] = Some(first_v);
        provenance[i] = Some(Provenance::Held);
    }
    for i in last_i + 1..values.len() {
        filled[i] = Some(last_v);
        provenance[i] = Some(Provenance::Held);
    }

    for pair in known.windows(2) {
        let (a, va) = pair[0];
        let (b, vb) = pair[1];
        let (lo, hi) = if va <= vb { (va, vb) } else { (vb, va) };
        for i in a + 1..b {
            let t = (i - a) as f64 / (b - a) as f64;
            filled[i] = Some((va + (vb - va) * t).clamp(lo, hi));
            provenance[i] = Some(Provenance::Interpolated);
        }
    }

    (filled, provenance)
}

/// Forward fill, then backward fill for any leading gap.
fn fill_sources(sources: &mut [Option<String>]) {
    let mut carried: Option<String> = None;
    for source in sources.iter_mut() {
        match source {
            Some(s) => carried = Some(s.clone()),
            None => *source = carried.clone(),
        }
    }
    let mut carried: Option<String> = None;
    for source in sources.iter_mut().rev() {
        match source {
            Some(s) => carried = Some(s.clone()),
            None => *source = carried.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_population;

    fn france(series: &[PopulationSeries]) -> &PopulationSeries {
        series.iter().find(|s| s.entity == "France").unwrap()
    }

    #[test]
    fn test_fills_missing_months() {
        let result = interpolate_population(&sample_population(), PopulationSpan::ObservedMonths).unwrap();
        // Jan 2020 through Jul 2021
        assert_eq!(france(&result).points.len(), 19);

        let result = interpolate_population(&sample_population(), PopulationSpan::CalendarYears).unwrap();
        assert_eq!(france(&result).points.len(), 24);
    }

    #[test]
    fn test_interpolates_values() {
        let result = interpolate_population(&sample_population(), PopulationSpan::ObservedMonths).unwrap();
        let france = france(&result);

        let march = france.get(MonthKey::new(2020, 3)).unwrap();
        let expected = 8_500_000.0 + (8_480_000.0 - 8_500_000.0) * 2.0 / 6.0;
        assert!((march.childbearing_population.unwrap() - expected).abs() < 1e-6);
        assert_eq!(march.provenance, Some(Provenance::Interpolated));

        let july = france.get(MonthKey::new(2020, 7)).unwrap();
        assert_eq!(july.childbearing_population, Some(8_480_000.0));
        assert_eq!(july.provenance, Some(Provenance::Observed));
    }

    #[test]
    fn test_interpolation_within_bracketing_observations() {
        let rows = vec![
            RawObservation::new("Chile", 2000, 1, Some(3_000_000.0), "UN"),
            RawObservation::new("Chile", 2001, 1, Some(3_300_000.0), "UN"),
            RawObservation::new("Chile", 2003, 6, Some(3_100_000.0), "UN"),
        ];
        let result = interpolate_population(&rows, PopulationSpan::ObservedMonths).unwrap();
        let points = &result[0].points;

        let known: Vec<(MonthKey, f64)> = rows.iter().map(|o| (o.key(), o.value.unwrap())).collect();
        for point in points {
            let value = point.childbearing_population.unwrap();
            let before = known.iter().rev().find(|(k, _)| *k <= point.key()).unwrap();
            let after = known.iter().find(|(k, _)| *k >= point.key()).unwrap();
            let lo = before.1.min(after.1);
            let hi = before.1.max(after.1);
            assert!(value >= lo && value <= hi, "{} = {}", point.key(), value);
        }
    }

    #[test]
    fn test_edges_hold_nearest_value() {
        let rows = vec![
            RawObservation::new("Chile", 2000, 4, Some(3_000_000.0), "UN"),
            RawObservation::new("Chile", 2001, 9, Some(3_300_000.0), "UN"),
        ];
        let result = interpolate_population(&rows, PopulationSpan::CalendarYears).unwrap();
        let chile = &result[0];

        let jan = chile.get(MonthKey::new(2000, 1)).unwrap();
        assert_eq!(jan.childbearing_population, Some(3_000_000.0));
        assert_eq!(jan.provenance, Some(Provenance::Held));

        let dec = chile.get(MonthKey::new(2001, 12)).unwrap();
        assert_eq!(dec.childbearing_population, Some(3_300_000.0));
        assert_eq!(dec.provenance, Some(Provenance::Held));
    }

    #[test]
    fn test_single_observation_holds_constant() {
        let rows = vec![RawObservation::new("Malta", 2020, 7, Some(80_000.0), "UN")];

        let result = interpolate_population(&rows, PopulationSpan::ObservedMonths).unwrap();
        assert_eq!(result[0].points.len(), 1);

        let result = interpolate_population(&rows, PopulationSpan::CalendarYears).unwrap();
        assert_eq!(result[0].points.len(), 12);
        assert!(result[0]
            .points
            .iter()
            .all(|p| p.childbearing_population == Some(80_000.0)));
    }

    #[test]
    fn test_sources_forward_then_backward_filled() {
        let mut sources = vec![None, Some("HMD".to_string()), None, Some("JPOP".to_string()), None];
        fill_sources(&mut sources);
        let labels: Vec<_> = sources.iter().map(|s| s.as_deref().unwrap()).collect();
        assert_eq!(labels, vec!["HMD", "HMD", "HMD", "JPOP", "JPOP"]);
    }

    #[test]
    fn test_null_only_population_stays_null() {
        let rows = vec![
            RawObservation::new("Atlantis", 2000, 1, None, "UN"),
            RawObservation::new("Atlantis", 2000, 3, None, "UN"),
        ];
        let result = interpolate_population(&rows, PopulationSpan::ObservedMonths).unwrap();
        assert!(result[0]
            .points
            .iter()
            .all(|p| p.childbearing_population.is_none() && p.provenance.is_none()));
    }
}
