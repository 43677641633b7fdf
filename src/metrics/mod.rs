//! Per-entity metric calculators
//!
//! Each calculator mutates an [`EntitySeries`](crate::series::EntitySeries) in
//! place and only reads fields produced by the stages before it:
//! fertility, then seasonality, then conception.

mod conception;
mod fertility;
mod seasonality;

pub use conception::{apply_conception_rates, CONCEPTION_LAG_MONTHS};
pub use fertility::apply_fertility_rates;
pub use seasonality::{apply_seasonality, TrailingMean, TRAILING_WINDOW_MONTHS};

use crate::series::{EntitySeries, PopulationSeries};

/// Rates are expressed per 100,000 women aged 15-44
pub const RATE_SCALE: f64 = 100_000.0;

/// Null-propagating division.
///
/// `None` if either side is missing, the denominator is zero, or the result is
/// not finite.
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    let ratio = n / d;
    ratio.is_finite().then_some(ratio)
}

/// Run all three calculators over one entity
pub fn derive_metrics(series: &mut EntitySeries, population: Option<&PopulationSeries>) {
    apply_fertility_rates(series, population);
    apply_seasonality(series);
    apply_conception_rates(series);
}
