//! Composite offer score.
//!
//! score = w_price × price_score + w_conformity × conformity_score
//!
//! Both components lie in [0, 1] and lower is better, so the best offer of
//! a lot is the one with the smallest composite score.

use crate::weights::ScoreWeights;
use chantier_common::BidStatus;

/// Position of `amount` between the lot's lowest and highest bids:
/// 0.0 for the cheapest, 1.0 for the most expensive.
/// A lot where every bid has the same amount scores 0.0 throughout.
pub fn price_score(amount: f64, lowest: f64, highest: f64) -> f64 {
    let range = highest - lowest;
    if range == 0.0 {
        return 0.0;
    }
    (amount - lowest) / range
}

/// 0.0 for a received/retained offer, 1.0 otherwise.
pub fn conformity_score(status: BidStatus) -> f64 {
    if status.is_conforming() {
        0.0
    } else {
        1.0
    }
}

/// Weighted sum of the component scores. Weights are used as given.
pub fn composite_score(price_score: f64, conformity_score: f64, weights: &ScoreWeights) -> f64 {
    let components = [price_score, conformity_score];
    components
        .iter()
        .zip(weights.as_array().iter())
        .map(|(s, w)| s * w)
        .sum()
}

/// Relative difference of `value` from `reference`, in percent.
/// Returns 0.0 when the reference is zero.
pub fn percentage_change(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (value - reference) / reference * 100.0
}
