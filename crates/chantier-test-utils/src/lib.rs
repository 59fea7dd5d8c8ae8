//! Shared fixtures for Chantier tests.

use chantier_common::{BidRecord, BidStatus};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Builder for bid records. Defaults to a received offer without an amount,
/// with the bid id derived from the lot and company.
#[derive(Debug, Clone)]
pub struct BidBuilder {
    bid: BidRecord,
}

impl BidBuilder {
    pub fn new(lot_id: &str, company_id: &str) -> Self {
        Self {
            bid: BidRecord {
                id: format!("{lot_id}-{company_id}"),
                lot_id: lot_id.to_string(),
                lot_name: format!("Lot {lot_id}"),
                lot_number: lot_id.to_string(),
                company_id: company_id.to_string(),
                company_name: format!("Company {company_id}"),
                amount: None,
                status: BidStatus::OfferReceived,
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.bid.id = id.to_string();
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.bid.amount = Some(amount);
        self
    }

    pub fn status(mut self, status: BidStatus) -> Self {
        self.bid.status = status;
        self
    }

    pub fn lot_name(mut self, name: &str) -> Self {
        self.bid.lot_name = name.to_string();
        self
    }

    pub fn lot_number(mut self, number: &str) -> Self {
        self.bid.lot_number = number.to_string();
        self
    }

    pub fn company_name(mut self, name: &str) -> Self {
        self.bid.company_name = name.to_string();
        self
    }

    pub fn build(self) -> BidRecord {
        self.bid
    }
}

/// Seeded generator of plausible bid lists for property checks.
pub struct BidGenerator {
    rng: StdRng,
}

impl BidGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `priced` bids with amounts between 100 000 and 502 000 (thousand-euro steps,
    /// so ties happen) plus `unpriced` bids without an amount, shuffled
    /// together.
    pub fn lot(&mut self, lot_id: &str, priced: usize, unpriced: usize) -> Vec<BidRecord> {
        const STATUSES: [BidStatus; 5] = [
            BidStatus::OfferReceived,
            BidStatus::OfferReceived,
            BidStatus::Retained,
            BidStatus::Consulted,
            BidStatus::Withdrawn,
        ];

        let mut bids = Vec::with_capacity(priced + unpriced);
        for i in 0..priced {
            let amount = self.rng.gen_range(10..=50u32) as f64 * 10_000.0
                + self.rng.gen_range(0..3u32) as f64 * 1_000.0;
            let status = STATUSES[self.rng.gen_range(0..STATUSES.len())];
            bids.push(
                BidBuilder::new(lot_id, &format!("p{i}"))
                    .amount(amount)
                    .status(status)
                    .build(),
            );
        }
        for i in 0..unpriced {
            bids.push(
                BidBuilder::new(lot_id, &format!("u{i}"))
                    .status(BidStatus::Consulted)
                    .build(),
            );
        }

        bids.shuffle(&mut self.rng);
        bids
    }

    pub fn gen_range(&mut self, range: std::ops::RangeInclusive<usize>) -> usize {
        self.rng.gen_range(range)
    }
}

/// Assert two floats are within `eps`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected} ± {eps}, got {actual}"
    );
}
