/// Bid records exchanged between the procurement data layer and the offer
/// analysis engine. Field names serialize in camelCase to match the JSON
/// shape served to the project dashboards.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bid status
// ---------------------------------------------------------------------------

/// Procurement state of a company's bid on a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BidStatus {
    /// Company consulted, no offer yet.
    #[default]
    #[serde(rename = "consulte", alias = "consulté", alias = "consulted")]
    Consulted,
    #[serde(rename = "offre_recue", alias = "offre_reçue", alias = "offer_received")]
    OfferReceived,
    #[serde(rename = "retenu", alias = "retained")]
    Retained,
    #[serde(rename = "non_retenu", alias = "not_retained")]
    NotRetained,
    #[serde(rename = "desiste", alias = "désisté", alias = "withdrawn")]
    Withdrawn,
    /// Any label the import layer did not recognise.
    #[serde(rename = "autre", other)]
    Other,
}

impl BidStatus {
    /// Whether the offer was formally received into consideration.
    /// Drives the conformity component of the composite score.
    pub fn is_conforming(self) -> bool {
        matches!(self, BidStatus::OfferReceived | BidStatus::Retained)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BidStatus::Consulted => "consulte",
            BidStatus::OfferReceived => "offre_recue",
            BidStatus::Retained => "retenu",
            BidStatus::NotRetained => "non_retenu",
            BidStatus::Withdrawn => "desiste",
            BidStatus::Other => "autre",
        }
    }
}

impl From<&str> for BidStatus {
    /// Lenient label parsing for spreadsheet imports: case, surrounding
    /// whitespace, accents and space/underscore differences are ignored.
    fn from(label: &str) -> Self {
        let folded: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'é' | 'è' | 'ê' => 'e',
                'ç' => 'c',
                ' ' | '-' => '_',
                other => other,
            })
            .collect();

        match folded.as_str() {
            "consulte" | "consulted" => BidStatus::Consulted,
            "offre_recue" | "offer_received" | "received" => BidStatus::OfferReceived,
            "retenu" | "retained" => BidStatus::Retained,
            "non_retenu" | "not_retained" => BidStatus::NotRetained,
            "desiste" | "withdrawn" => BidStatus::Withdrawn,
            _ => BidStatus::Other,
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Bid record
// ---------------------------------------------------------------------------

/// One company's bid on one procurement lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    pub id: String,
    pub lot_id: String,
    #[serde(default)]
    pub lot_name: String,
    #[serde(default)]
    pub lot_number: String,
    pub company_id: String,
    #[serde(default)]
    pub company_name: String,
    /// Pre-tax amount. `None` when the company has not priced the lot.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: BidStatus,
}

impl BidRecord {
    /// The amount usable for analysis: present and finite.
    pub fn priced_amount(&self) -> Option<f64> {
        self.amount.filter(|a| a.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_accented_label() {
        let s: BidStatus = serde_json::from_str("\"offre_reçue\"").unwrap();
        assert_eq!(s, BidStatus::OfferReceived);
        assert!(s.is_conforming());
    }

    #[test]
    fn test_unknown_status_is_other() {
        let s: BidStatus = serde_json::from_str("\"en_attente\"").unwrap();
        assert_eq!(s, BidStatus::Other);
        assert!(!s.is_conforming());
    }

    #[test]
    fn test_status_from_spreadsheet_label() {
        assert_eq!(BidStatus::from(" Offre reçue "), BidStatus::OfferReceived);
        assert_eq!(BidStatus::from("NON RETENU"), BidStatus::NotRetained);
        assert_eq!(BidStatus::from("Désisté"), BidStatus::Withdrawn);
        assert_eq!(BidStatus::from("???"), BidStatus::Other);
    }

    #[test]
    fn test_only_received_and_retained_conform() {
        assert!(BidStatus::Retained.is_conforming());
        assert!(!BidStatus::Consulted.is_conforming());
        assert!(!BidStatus::NotRetained.is_conforming());
        assert!(!BidStatus::Withdrawn.is_conforming());
    }

    #[test]
    fn test_bid_json_shape() {
        let json = r#"{
            "id": "b1", "lotId": "L1", "lotName": "Gros oeuvre", "lotNumber": "02",
            "companyId": "c1", "companyName": "Maçonnerie Dupont",
            "amount": null, "status": "consulte"
        }"#;
        let bid: BidRecord = serde_json::from_str(json).unwrap();
        assert_eq!(bid.lot_id, "L1");
        assert_eq!(bid.amount, None);
        assert_eq!(bid.priced_amount(), None);
    }

    #[test]
    fn test_non_finite_amount_is_unpriced() {
        let bid = BidRecord {
            id: "b".into(),
            lot_id: "L".into(),
            lot_name: String::new(),
            lot_number: String::new(),
            company_id: "c".into(),
            company_name: String::new(),
            amount: Some(f64::NAN),
            status: BidStatus::OfferReceived,
        };
        assert_eq!(bid.priced_amount(), None);
    }
}
