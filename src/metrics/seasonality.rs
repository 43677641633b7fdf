//! Seasonality ratios and shares of annual births

use super::safe_ratio;
use crate::calendar::NORMALIZED_MONTH_DAYS;
use crate::series::{EntitySeries, MonthlyRecord};
use std::collections::VecDeque;
use std::ops::Range;

/// Length of the trailing moving-average window
pub const TRAILING_WINDOW_MONTHS: usize = 12;

/// Trailing mean over a fixed number of consecutive values.
///
/// Emits `None` until the window is full and whenever any value in the window
/// is missing. Partial windows never produce a mean.
#[derive(Debug, Clone)]
pub struct TrailingMean {
    size: usize,
    window: VecDeque<Option<f64>>,
}

impl TrailingMean {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            window: VecDeque::with_capacity(size),
        }
    }

    /// Push the next value and return the mean of the last `size` values
    pub fn push(&mut self, value: Option<f64>) -> Option<f64> {
        if self.window.len() == self.size {
            self.window.pop_front();
        }
        self.window.push_back(value);

        if self.size == 0 || self.window.len() < self.size {
            return None;
        }
        let mut sum = 0.0;
        for v in &self.window {
            sum += (*v)?;
        }
        Some(sum / self.size as f64)
    }
}

/// Fill the trailing-12-month and annual seasonality fields.
///
/// Expects `daily_fertility_rate` to be populated already.
pub fn apply_seasonality(series: &mut EntitySeries) {
    let mut trailing = TrailingMean::new(TRAILING_WINDOW_MONTHS);
    for record in series.records.iter_mut() {
        record.dfr_t12m_ma = trailing.push(record.daily_fertility_rate);
        record.seasonality_ratio_t12m = safe_ratio(record.daily_fertility_rate, record.dfr_t12m_ma);
    }

    for span in year_spans(&series.records) {
        apply_annual(&mut series.records[span]);
    }
}

fn apply_annual(year: &mut [MonthlyRecord]) {
    let rates: Vec<f64> = year.iter().filter_map(|r| r.daily_fertility_rate).collect();
    let mean_rate = (!rates.is_empty()).then(|| rates.iter().sum::<f64>() / rates.len() as f64);

    for record in year.iter_mut() {
        record.seasonality_ratio_annual = safe_ratio(record.daily_fertility_rate, mean_rate);
    }

    // Shares of the year are only meaningful when every month has births
    let complete = year.len() == 12 && year.iter().all(|r| r.births.is_some());
    if !complete {
        for record in year.iter_mut() {
            record.seasonality_percentage_annual = None;
            record.seasonality_percentage_normalized = None;
        }
        return;
    }

    let annual: f64 = year.iter().filter_map(|r| r.births).sum();
    let normalized: Vec<Option<f64>> = year.iter().map(normalized_births).collect();
    // Sum of 30-day-equivalent births rather than annual * 360 / days_in_year;
    // the two differ by roughly 1e-4 relative, and only this one sums to 1
    let normalized_annual: f64 = normalized.iter().flatten().sum();

    for (record, norm) in year.iter_mut().zip(normalized) {
        record.seasonality_percentage_annual = safe_ratio(record.births, Some(annual));
        record.seasonality_percentage_normalized = safe_ratio(norm, Some(normalized_annual));
    }
}

/// Births rescaled to a 30-day month
fn normalized_births(record: &MonthlyRecord) -> Option<f64> {
    safe_ratio(record.births, Some(record.days_in_month as f64)).map(|per_day| per_day * NORMALIZED_MONTH_DAYS)
}

/// Index ranges of consecutive records sharing a calendar year
fn year_spans(records: &[MonthlyRecord]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for i in 1..=records.len() {
        if i == records.len() || records[i].year != records[start].year {
            if start < i {
                spans.push(start..i);
            }
            start = i;
        }
    }
    spans
}
