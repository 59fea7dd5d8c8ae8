//! Markdown rendering of offer analyses.

use crate::analyzer::{AnalyzedOffer, OfferAnalysisResult};
use std::collections::BTreeMap;

/// Render every lot analysis, in map order, as a Markdown report.
pub fn generate_offer_analysis_report(results: &BTreeMap<String, OfferAnalysisResult>) -> String {
    let mut out = String::from("# Offer analysis report\n\n");

    if results.is_empty() {
        out.push_str("_No priced offers to analyse._\n");
        return out;
    }

    for result in results.values() {
        write_lot(&mut out, result);
    }
    out
}

fn write_lot(out: &mut String, result: &OfferAnalysisResult) {
    let stats = &result.statistics;

    out.push_str(&format!("## Lot {} - {}\n\n", result.lot_number, result.lot_name));
    out.push_str(&format!("Lot id: `{}`\n", result.lot_id));
    if let Some(estimate) = result.estimated_price {
        out.push_str(&format!("Estimated price: {}\n", format_amount(estimate)));
    }

    out.push_str("\n### Statistics\n\n");
    out.push_str(&format!("- Offers: {}\n", stats.count));
    out.push_str(&format!("- Lowest: {}\n", format_amount(stats.lowest)));
    out.push_str(&format!("- Highest: {}\n", format_amount(stats.highest)));
    out.push_str(&format!("- Average: {}\n", format_amount(stats.average)));
    out.push_str(&format!("- Median: {}\n", format_amount(stats.median)));
    out.push_str(&format!("- Standard deviation: {}\n", format_amount(stats.standard_deviation)));
    out.push_str(&format!("- Range: {}\n", format_amount(stats.range)));

    out.push_str("\n### Ranking\n\n");
    out.push_str("| Rank | Company | Status | Amount | vs average | vs estimate | Score | Recommendation |\n");
    out.push_str("|---:|---|---|---:|---:|---:|---:|---|\n");
    for offer in &result.offers {
        write_offer_row(out, offer);
    }

    if !result.anomalies.is_empty() {
        out.push_str("\n### Anomalies\n\n");
        for anomaly in &result.anomalies {
            out.push_str(&format!(
                "- **{}** ({}, {}): {}\n",
                anomaly.company_name,
                format_amount(anomaly.amount),
                anomaly.severity,
                anomaly.reason
            ));
        }
    }
    out.push('\n');
}

fn write_offer_row(out: &mut String, offer: &AnalyzedOffer) {
    let mut amount = format_amount(offer.amount);
    if offer.is_lowest {
        amount.push_str(" (lowest)");
    }
    if offer.is_highest {
        amount.push_str(" (highest)");
    }

    let vs_estimate = offer
        .percentage_from_estimate
        .map(format_percentage)
        .unwrap_or_else(|| "-".to_string());
    let recommendation = offer
        .recommendation
        .map(|r| format!("{} ({})", r, r.label_fr()))
        .unwrap_or_default();
    let flag = if offer.is_anomaly { " ⚠" } else { "" };

    out.push_str(&format!(
        "| {} | {}{} | {} | {} | {} | {} | {:.3} | {} |\n",
        offer.rank,
        offer.company_name,
        flag,
        offer.status,
        amount,
        format_percentage(offer.percentage_from_average),
        vs_estimate,
        offer.score,
        recommendation
    ));
}

/// `1234567.891` → `1 234 567.89 €`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part} €")
}

/// Signed percentage with two decimals: `+11.11%`, `-53.85%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:+.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze_all_offers, AnalysisOptions};
    use chantier_test_utils::BidBuilder;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00 €");
        assert_eq!(format_amount(999.5), "999.50 €");
        assert_eq!(format_amount(86_666.666_7), "86 666.67 €");
        assert_eq!(format_amount(1_234_567.891), "1 234 567.89 €");
        assert_eq!(format_amount(-1500.0), "-1 500.00 €");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(11.111), "+11.11%");
        assert_eq!(format_percentage(-53.846), "-53.85%");
    }

    #[test]
    fn test_empty_report() {
        let report = generate_offer_analysis_report(&BTreeMap::new());
        assert!(report.contains("No priced offers"));
    }

    #[test]
    fn test_report_lists_lots_offers_and_anomalies() {
        let bids = vec![
            BidBuilder::new("L1", "A").company_name("Alpha").amount(100_000.0).build(),
            BidBuilder::new("L1", "B").company_name("Bravo").amount(120_000.0).build(),
            BidBuilder::new("L1", "C").company_name("Charlie").amount(40_000.0).build(),
            BidBuilder::new("L2", "D").company_name("Delta").lot_name("Plomberie").amount(5_000.0).build(),
        ];
        let options = AnalysisOptions::default().with_estimate("L2", 4_000.0);
        let results = analyze_all_offers(&bids, &options);
        let report = generate_offer_analysis_report(&results);

        assert!(report.contains("## Lot L1 - Lot L1"));
        assert!(report.contains("## Lot L2 - Plomberie"));
        assert!(report.find("## Lot L1").unwrap() < report.find("## Lot L2").unwrap());
        for name in ["Alpha", "Bravo", "Charlie", "Delta"] {
            assert!(report.contains(name), "missing {name}");
        }
        assert!(report.contains("Estimated price: 4 000.00 €"));
        assert!(report.contains("+25.00%"));
        assert!(report.contains("### Anomalies"));
        assert!(report.contains("Price abnormally low"));
        assert!(report.contains("best-value (mieux-disant)"));
        assert!(report.contains("- Average: 86 666.67 €"));
    }
}
