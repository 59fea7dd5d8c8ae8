//! chantier-offers: Tender offer analysis engine.
//!
//! Given the bids received on a procurement lot, computes descriptive
//! statistics, scores and ranks every offer, flags abnormal prices and
//! labels the best-value and lowest bids. Pure and synchronous: every call
//! works only on its arguments and returns fresh data.

pub mod statistics;
pub mod weights;
pub mod scorer;
pub mod anomaly;
pub mod analyzer;
pub mod report;

pub use analyzer::{
    analyze_all_offers, analyze_offers_for_lot, AnalysisOptions, AnalyzedOffer,
    OfferAnalysisResult, Recommendation,
};
pub use anomaly::{AnomalyDirection, AnomalySeverity, OfferAnomaly};
pub use report::generate_offer_analysis_report;
pub use statistics::OfferStatistics;
pub use weights::ScoreWeights;
