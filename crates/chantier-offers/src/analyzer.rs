//! Per-lot offer analysis.
//!
//! Pipeline for one lot: keep priced bids → statistics → per-offer
//! scoring → stable sort and rank → recommendation → anomaly list.

use crate::anomaly::{is_anomalous, OfferAnomaly};
use crate::scorer::{composite_score, conformity_score, percentage_change, price_score};
use crate::statistics::OfferStatistics;
use crate::weights::ScoreWeights;
use chantier_common::{AnalysisConfig, BidRecord, BidStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

// ── Options ──────────────────────────────────────────────────────────────────

/// Per-invocation analysis settings. Values are used as given, without
/// validation: weights that do not sum to 1 simply scale the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Budget estimate per lot id
    #[serde(default)]
    pub estimated_prices: HashMap<String, f64>,
    /// Percent deviation from the average beyond which an offer is anomalous
    pub anomaly_threshold: f64,
    pub weights: ScoreWeights,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            estimated_prices: HashMap::new(),
            anomaly_threshold: 15.0,
            weights: ScoreWeights::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_estimate(mut self, lot_id: impl Into<String>, estimate: f64) -> Self {
        self.estimated_prices.insert(lot_id.into(), estimate);
        self
    }

    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            estimated_prices: config.estimates.clone(),
            anomaly_threshold: config.analysis.anomaly_threshold,
            weights: ScoreWeights::from(&config.analysis.weights),
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Label attached to an offer after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    /// Abnormally low price; needs justification before award.
    Anomaly,
    /// Best composite score (mieux-disant).
    BestValue,
    /// Cheapest amount (moins-disant).
    LowestBid,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Anomaly => "anomaly",
            Recommendation::BestValue => "best-value",
            Recommendation::LowestBid => "lowest-bid",
        }
    }

    /// French procurement wording used on tender reports.
    pub fn label_fr(self) -> &'static str {
        match self {
            Recommendation::Anomaly => "offre anormalement basse",
            Recommendation::BestValue => "mieux-disant",
            Recommendation::LowestBid => "moins-disant",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One priced bid after scoring and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedOffer {
    pub bid_id: String,
    pub company_id: String,
    pub company_name: String,
    pub status: BidStatus,
    pub amount: f64,
    pub percentage_from_average: f64,
    /// Only set when the lot has a budget estimate.
    pub percentage_from_estimate: Option<f64>,
    pub is_lowest: bool,
    pub is_highest: bool,
    pub is_anomaly: bool,
    pub price_score: f64,
    pub conformity_score: f64,
    /// Composite score; lower is better.
    pub score: f64,
    /// 1-based position in ascending score order.
    pub rank: usize,
    pub recommendation: Option<Recommendation>,
}

/// Analysis of every priced bid on one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnalysisResult {
    pub lot_id: String,
    pub lot_name: String,
    pub lot_number: String,
    pub estimated_price: Option<f64>,
    pub statistics: OfferStatistics,
    /// Sorted by rank.
    pub offers: Vec<AnalyzedOffer>,
    pub anomalies: Vec<OfferAnomaly>,
}

impl OfferAnalysisResult {
    /// The rank-1 offer.
    pub fn best_offer(&self) -> Option<&AnalyzedOffer> {
        self.offers.first()
    }

    /// All offers carrying the lowest amount (several when tied).
    pub fn lowest_offers(&self) -> impl Iterator<Item = &AnalyzedOffer> {
        self.offers.iter().filter(|o| o.is_lowest)
    }

    pub fn offer_for_company(&self, company_id: &str) -> Option<&AnalyzedOffer> {
        self.offers.iter().find(|o| o.company_id == company_id)
    }
}

// ── Analysis ─────────────────────────────────────────────────────────────────

/// Analyse the bids of a single lot.
///
/// Bids without an amount are ignored. Returns `None` when no priced bid is
/// left, which includes an empty input. The bids are expected to share one
/// `lot_id`; lot identity is taken from the first priced bid.
pub fn analyze_offers_for_lot(
    bids: &[BidRecord],
    options: &AnalysisOptions,
) -> Option<OfferAnalysisResult> {
    let refs: Vec<&BidRecord> = bids.iter().collect();
    analyze_lot(&refs, options)
}

/// Group bids by `lot_id` and analyse each lot.
/// Lots without any priced bid are left out of the map.
pub fn analyze_all_offers(
    bids: &[BidRecord],
    options: &AnalysisOptions,
) -> BTreeMap<String, OfferAnalysisResult> {
    let mut by_lot: BTreeMap<&str, Vec<&BidRecord>> = BTreeMap::new();
    for bid in bids {
        by_lot.entry(bid.lot_id.as_str()).or_default().push(bid);
    }

    by_lot
        .into_iter()
        .filter_map(|(lot_id, lot_bids)| {
            analyze_lot(&lot_bids, options).map(|result| (lot_id.to_string(), result))
        })
        .collect()
}

fn analyze_lot(bids: &[&BidRecord], options: &AnalysisOptions) -> Option<OfferAnalysisResult> {
    let priced: Vec<(&BidRecord, f64)> = bids
        .iter()
        .filter_map(|bid| bid.priced_amount().map(|amount| (*bid, amount)))
        .collect();

    let Some((first, _)) = priced.first() else {
        debug!("No priced bid among {} bids, nothing to analyse", bids.len());
        return None;
    };

    let amounts: Vec<f64> = priced.iter().map(|(_, amount)| *amount).collect();
    let statistics = OfferStatistics::from_amounts(&amounts)?;
    let estimated_price = options.estimated_prices.get(&first.lot_id).copied();
    let threshold = options.anomaly_threshold;

    let mut offers: Vec<AnalyzedOffer> = priced
        .iter()
        .map(|(bid, amount)| {
            score_offer(bid, *amount, &statistics, estimated_price, options)
        })
        .collect();

    // sort_by is stable: equal scores keep input order
    offers.sort_by(|a, b| a.score.total_cmp(&b.score));

    for (idx, offer) in offers.iter_mut().enumerate() {
        offer.rank = idx + 1;
        offer.recommendation = recommend(offer, threshold);
    }

    let anomalies: Vec<OfferAnomaly> = offers
        .iter()
        .filter(|o| o.is_anomaly)
        .map(|o| OfferAnomaly::for_offer(o, threshold))
        .collect();

    debug!(
        "Lot {}: {} offers, average {:.2}, {} anomalies",
        first.lot_id,
        offers.len(),
        statistics.average,
        anomalies.len()
    );

    Some(OfferAnalysisResult {
        lot_id: first.lot_id.clone(),
        lot_name: first.lot_name.clone(),
        lot_number: first.lot_number.clone(),
        estimated_price,
        statistics,
        offers,
        anomalies,
    })
}

fn score_offer(
    bid: &BidRecord,
    amount: f64,
    statistics: &OfferStatistics,
    estimated_price: Option<f64>,
    options: &AnalysisOptions,
) -> AnalyzedOffer {
    let percentage_from_average = percentage_change(amount, statistics.average);
    let percentage_from_estimate = estimated_price
        .filter(|estimate| *estimate != 0.0)
        .map(|estimate| percentage_change(amount, estimate));

    let price = price_score(amount, statistics.lowest, statistics.highest);
    let conformity = conformity_score(bid.status);

    AnalyzedOffer {
        bid_id: bid.id.clone(),
        company_id: bid.company_id.clone(),
        company_name: bid.company_name.clone(),
        status: bid.status,
        amount,
        percentage_from_average,
        percentage_from_estimate,
        is_lowest: amount == statistics.lowest,
        is_highest: amount == statistics.highest,
        is_anomaly: is_anomalous(percentage_from_average, options.anomaly_threshold),
        price_score: price,
        conformity_score: conformity,
        score: composite_score(price, conformity, &options.weights),
        rank: 0,
        recommendation: None,
    }
}

/// An abnormally low price overrides every other label. Abnormally high
/// prices are only reported as anomalies and can still be labelled.
fn recommend(offer: &AnalyzedOffer, threshold: f64) -> Option<Recommendation> {
    if offer.is_anomaly && offer.percentage_from_average < -threshold {
        Some(Recommendation::Anomaly)
    } else if offer.rank == 1 {
        Some(Recommendation::BestValue)
    } else if offer.is_lowest {
        Some(Recommendation::LowestBid)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalySeverity;
    use chantier_test_utils::BidBuilder;

    fn received(company: &str, amount: f64) -> BidRecord {
        BidBuilder::new("L1", company).amount(amount).build()
    }

    #[test]
    fn test_empty_input_is_none() {
        assert!(analyze_offers_for_lot(&[], &AnalysisOptions::default()).is_none());
    }

    #[test]
    fn test_only_unpriced_bids_is_none() {
        let bids = vec![BidBuilder::new("L1", "A").build()];
        assert!(analyze_offers_for_lot(&bids, &AnalysisOptions::default()).is_none());
    }

    #[test]
    fn test_unpriced_bids_are_skipped() {
        let bids = vec![
            received("A", 100.0),
            BidBuilder::new("L1", "B").build(),
            received("C", 200.0),
        ];
        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.offers.len(), 2);
        assert_eq!(result.statistics.count, 2);
        assert!(result.offer_for_company("B").is_none());
    }

    #[test]
    fn test_lot_identity_from_first_priced_bid() {
        let bids = vec![
            BidBuilder::new("L7", "A").lot_name("Ignored").build(),
            BidBuilder::new("L7", "B").lot_name("Charpente").lot_number("07").amount(10.0).build(),
        ];
        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.lot_id, "L7");
        assert_eq!(result.lot_name, "Charpente");
        assert_eq!(result.lot_number, "07");
    }

    #[test]
    fn test_non_conforming_offer_ranks_after_conforming() {
        // Same amount: the consulted-only bid pays the conformity weight
        let bids = vec![
            BidBuilder::new("L1", "A").amount(100.0).status(BidStatus::Consulted).build(),
            received("B", 100.0),
        ];
        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.offers[0].company_id, "B");
        assert_eq!(result.offers[0].score, 0.0);
        assert!((result.offers[1].score - 0.3).abs() < 1e-12);
        assert_eq!(result.offers[0].recommendation, Some(Recommendation::BestValue));
        // tied lowest amount, not rank 1
        assert_eq!(result.offers[1].recommendation, Some(Recommendation::LowestBid));
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let bids = vec![received("A", 100.0), received("B", 100.0), received("C", 100.0)];
        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        let order: Vec<&str> = result.offers.iter().map(|o| o.company_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        let ranks: Vec<usize> = result.offers.iter().map(|o| o.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_high_anomaly_keeps_best_value_label() {
        // A lone conforming bid among withdrawn ones can be both rank 1 and
        // abnormally expensive
        let weights = ScoreWeights::new(0.1, 0.9);
        let options = AnalysisOptions::default().with_weights(weights);
        let bids = vec![
            BidBuilder::new("L1", "A").amount(100.0).status(BidStatus::Withdrawn).build(),
            BidBuilder::new("L1", "B").amount(100.0).status(BidStatus::Withdrawn).build(),
            received("C", 200.0),
        ];
        let result = analyze_offers_for_lot(&bids, &options).unwrap();
        let best = result.best_offer().unwrap();
        assert_eq!(best.company_id, "C");
        assert!(best.is_anomaly);
        assert!(best.percentage_from_average > 15.0);
        assert_eq!(best.recommendation, Some(Recommendation::BestValue));

        // 200 is +50% of the 133.33 average; the two 100s are -25%
        assert_eq!(result.anomalies.len(), 3);
        assert_eq!(result.anomalies[0].company_id, "C");
        assert_eq!(result.anomalies[0].severity, AnomalySeverity::High);
        assert_eq!(result.anomalies[1].severity, AnomalySeverity::Medium);
        assert_eq!(result.offers[1].recommendation, Some(Recommendation::Anomaly));
    }

    #[test]
    fn test_custom_threshold() {
        let bids = vec![received("A", 90.0), received("B", 110.0)];
        let strict = AnalysisOptions::default().with_anomaly_threshold(5.0);
        let result = analyze_offers_for_lot(&bids, &strict).unwrap();
        assert!(result.offers.iter().all(|o| o.is_anomaly));

        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_zero_estimate_is_ignored() {
        let bids = vec![received("A", 100.0)];
        let options = AnalysisOptions::default().with_estimate("L1", 0.0);
        let result = analyze_offers_for_lot(&bids, &options).unwrap();
        assert_eq!(result.estimated_price, Some(0.0));
        assert_eq!(result.offers[0].percentage_from_estimate, None);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AnalysisConfig::default();
        config.analysis.anomaly_threshold = 12.5;
        config.estimates.insert("L1".into(), 1000.0);
        let options = AnalysisOptions::from(&config);
        assert_eq!(options.anomaly_threshold, 12.5);
        assert_eq!(options.weights, ScoreWeights::default());
        assert_eq!(options.estimated_prices.get("L1"), Some(&1000.0));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let bids = vec![received("A", 100.0)];
        let result = analyze_offers_for_lot(&bids, &AnalysisOptions::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["lotId"], "L1");
        assert_eq!(json["statistics"]["standardDeviation"], 0.0);
        assert_eq!(json["offers"][0]["recommendation"], "best-value");
        assert_eq!(json["offers"][0]["isLowest"], true);
    }
}
