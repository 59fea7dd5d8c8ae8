//! Abnormal price detection.
//!
//! An offer is anomalous when its amount deviates from the lot average by
//! more than the configured threshold, in either direction.

use crate::analyzer::AnalyzedOffer;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Reserved tier; the current rule only yields Medium or High.
    Low,
    Medium,
    High,
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnomalySeverity::Low => "low",
            AnomalySeverity::Medium => "medium",
            AnomalySeverity::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyDirection {
    LowPrice,
    HighPrice,
}

/// An offer whose price deviates abnormally from the lot average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnomaly {
    pub bid_id: String,
    pub company_id: String,
    pub company_name: String,
    pub amount: f64,
    pub percentage_from_average: f64,
    pub direction: AnomalyDirection,
    pub severity: AnomalySeverity,
    pub reason: String,
}

/// Strictly greater than the threshold; a deviation equal to it is normal.
pub fn is_anomalous(percentage_from_average: f64, threshold: f64) -> bool {
    percentage_from_average.abs() > threshold
}

/// High beyond twice the threshold, Medium otherwise.
pub fn classify_severity(percentage_from_average: f64, threshold: f64) -> AnomalySeverity {
    if percentage_from_average.abs() > 2.0 * threshold {
        AnomalySeverity::High
    } else {
        AnomalySeverity::Medium
    }
}

impl OfferAnomaly {
    pub fn for_offer(offer: &AnalyzedOffer, threshold: f64) -> Self {
        let deviation = offer.percentage_from_average;
        let direction = if deviation < 0.0 {
            AnomalyDirection::LowPrice
        } else {
            AnomalyDirection::HighPrice
        };
        let reason = match direction {
            AnomalyDirection::LowPrice => format!(
                "Price abnormally low: {:.1}% below the average",
                deviation.abs()
            ),
            AnomalyDirection::HighPrice => format!(
                "Price abnormally high: {:.1}% above the average",
                deviation.abs()
            ),
        };

        Self {
            bid_id: offer.bid_id.clone(),
            company_id: offer.company_id.clone(),
            company_name: offer.company_name.clone(),
            amount: offer.amount,
            percentage_from_average: deviation,
            direction,
            severity: classify_severity(deviation, threshold),
            reason,
        }
    }
}
