//! Descriptive statistics over the priced bids of a lot.
//!
//! Every helper returns 0.0 on empty input rather than NaN, so a lot with
//! a single bid or identical bids still produces a usable summary.

use serde::{Deserialize, Serialize};

/// Summary of the bid amounts received on one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferStatistics {
    pub count: usize,
    pub lowest: f64,
    pub highest: f64,
    pub average: f64,
    pub median: f64,
    /// Population standard deviation (divides by N).
    pub standard_deviation: f64,
    /// highest − lowest
    pub range: f64,
}

impl OfferStatistics {
    /// Summarise a set of amounts. Returns `None` when there is nothing to summarise.
    pub fn from_amounts(amounts: &[f64]) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }

        let lowest = amounts.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count: amounts.len(),
            lowest,
            highest,
            average: mean(amounts),
            median: median(amounts),
            standard_deviation: population_std_dev(amounts),
            range: highest - lowest,
        })
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; average of the two middle values for an even count.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
