//! Inclusion filter
//!
//! An entity is kept when it has enough complete years AND its smallest
//! monthly births count clears the floor. Exclusion is logged, never an error.

use super::{complete_years, min_monthly_births, FilterThresholds};
use crate::series::EntitySeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an entity failed the filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExclusionReason {
    TooFewCompleteYears { complete_years: u32, required: u32 },
    /// `smallest` is `None` when the entity has no births at all
    BirthsBelowFloor { smallest: Option<f64>, floor: u32 },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::TooFewCompleteYears { complete_years, required } => {
                write!(f, "{} complete years < {}", complete_years, required)
            }
            ExclusionReason::BirthsBelowFloor { smallest: Some(v), floor } => {
                write!(f, "min monthly births {} < {}", v, floor)
            }
            ExclusionReason::BirthsBelowFloor { smallest: None, floor } => {
                write!(f, "no births observed (floor {})", floor)
            }
        }
    }
}

/// Filter outcome for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionDecision {
    pub entity: String,
    pub complete_years: u32,
    pub min_monthly_births: Option<f64>,
    pub included: bool,
    /// Every failed condition, empty when included
    pub reasons: Vec<ExclusionReason>,
    pub thresholds: FilterThresholds,
}

impl InclusionDecision {
    /// Decide from precomputed figures
    pub fn decide(
        entity: &str,
        complete_years: u32,
        min_monthly_births: Option<f64>,
        thresholds: FilterThresholds,
    ) -> Self {
        let mut reasons = Vec::new();
        if complete_years < thresholds.min_complete_years {
            reasons.push(ExclusionReason::TooFewCompleteYears {
                complete_years,
                required: thresholds.min_complete_years,
            });
        }
        // A zero floor always passes, even for an entity without births
        if thresholds.min_monthly_births > 0 {
            let clears = min_monthly_births.is_some_and(|v| v >= thresholds.min_monthly_births as f64);
            if !clears {
                reasons.push(ExclusionReason::BirthsBelowFloor {
                    smallest: min_monthly_births,
                    floor: thresholds.min_monthly_births,
                });
            }
        }

        Self {
            entity: entity.to_string(),
            complete_years,
            min_monthly_births,
            included: reasons.is_empty(),
            reasons,
            thresholds,
        }
    }

    /// Reasons joined for logs and tables
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Evaluate one entity with fertility rates already applied
pub fn evaluate_inclusion(series: &EntitySeries, thresholds: FilterThresholds) -> InclusionDecision {
    InclusionDecision::decide(
        &series.entity,
        complete_years(series).len() as u32,
        min_monthly_births(series),
        thresholds,
    )
}

/// Split entities into the kept series and a decision for every entity.
///
/// Decisions preserve the input order.
pub fn apply_inclusion_filter(
    series: Vec<EntitySeries>,
    thresholds: FilterThresholds,
) -> (Vec<EntitySeries>, Vec<InclusionDecision>) {
    let decisions: Vec<InclusionDecision> = series.iter().map(|s| evaluate_inclusion(s, thresholds)).collect();
    let kept = retain_included(series, &decisions);
    (kept, decisions)
}

/// Keep the series whose decision is `included`, logging the rest
pub(crate) fn retain_included(series: Vec<EntitySeries>, decisions: &[InclusionDecision]) -> Vec<EntitySeries> {
    let mut kept = Vec::with_capacity(series.len());
    for (s, decision) in series.into_iter().zip(decisions) {
        if decision.included {
            kept.push(s);
        } else {
            log::info!("Excluding {}: {}", decision.entity, decision.reason_text());
        }
    }
    log::debug!("Inclusion filter kept {} of {} entities", kept.len(), decisions.len());
    kept
}
