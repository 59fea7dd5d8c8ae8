//! Weights of the composite offer score.

use chantier_common::WeightsConfig;
use serde::{Deserialize, Serialize};

/// Relative contribution of price competitiveness and conformity.
/// Expected to sum to 1.0, though the scorer does not require it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub price: f64,
    pub conformity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            price: 0.7,
            conformity: 0.3,
        }
    }
}

impl ScoreWeights {
    pub fn new(price: f64, conformity: f64) -> Self {
        Self { price, conformity }
    }

    /// Validate that the weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.price + self.conformity - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum = self.price + self.conformity;
        if sum > 0.0 {
            self.price /= sum;
            self.conformity /= sum;
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.price, self.conformity]
    }
}

impl From<&WeightsConfig> for ScoreWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self::new(config.price, config.conformity)
    }
}
