//! Monthly index builder for the births branch
//!
//! Expands each entity's sparse observations into one record per month from
//! its earliest to its latest observed month. Source provenance is carried
//! forward into unobserved months; the births value is not.

use super::{month_date, EntitySeries, MonthlyRecord};
use crate::error::Result;
use crate::observation::{group_by_entity, validate_observations, ObservationKind, RawObservation};

/// Build the gapless monthly births index for every entity.
///
/// Output is sorted by entity, then chronologically. An entity with a single
/// observation yields a single-month series.
pub fn build_monthly_index(observations: &[RawObservation]) -> Result<Vec<EntitySeries>> {
    validate_observations(observations, ObservationKind::Births)?;

    let mut out = Vec::new();
    for (entity, rows) in group_by_entity(observations) {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            continue;
        };

        let mut pending = rows.iter().peekable();
        let mut carried_source: Option<String> = None;
        let mut records = Vec::with_capacity((first.key().months_until(last.key()) + 1) as usize);

        for key in first.key().through(last.key()) {
            let mut record = MonthlyRecord::new(key, month_date(entity, key)?);

            if let Some(obs) = pending.next_if(|obs| obs.key() == key) {
                record.births = obs.value;
                if obs.source.is_some() {
                    carried_source = obs.source.clone();
                }
            }
            // Forward fill only: months before the first sourced row keep None
            record.source = carried_source.clone();

            records.push(record);
        }

        log::debug!(
            "{}: {} births months from {} to {} ({} observed)",
            entity,
            records.len(),
            first.key(),
            last.key(),
            rows.len()
        );

        out.push(EntitySeries {
            entity: entity.to_string(),
            records,
        });
    }

    Ok(out)
}
