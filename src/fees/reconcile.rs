use rust_decimal::Decimal;
use serde::Serialize;

use crate::fees::calculator::FeeBreakdown;
use crate::fees::schedule::FeeSchedule;
use crate::money::{round_cents, Principal};

/// Which part of a fresh quote a persisted fee corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMatch {
    TotalFee,
    BuyerShare,
    SellerShare,
    Drift,
}

/// Result of comparing a backend-persisted `escrowFee` with the current
/// schedule. Informational only: the persisted fee stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub quoted: FeeBreakdown,
    pub persisted: Decimal,
    pub matched: FeeMatch,
    /// `persisted - quoted.total_fee`, in cents.
    pub difference: Decimal,
}

impl Reconciliation {
    pub fn is_drift(&self) -> bool {
        self.matched == FeeMatch::Drift
    }
}

/// Compares amounts at cent precision. When the buyer and seller shares are
/// equal (as in the standard schedule) a share match reports `BuyerShare`.
pub fn reconcile(schedule: &FeeSchedule, principal: Principal, persisted: Decimal) -> Reconciliation {
    let quoted = schedule.calculate(principal).rounded();
    let persisted = round_cents(persisted);

    let matched = if persisted == quoted.total_fee {
        FeeMatch::TotalFee
    } else if persisted == quoted.buyer_fee {
        FeeMatch::BuyerShare
    } else if persisted == quoted.seller_fee {
        FeeMatch::SellerShare
    } else {
        FeeMatch::Drift
    };

    Reconciliation {
        quoted,
        persisted,
        matched,
        difference: persisted - quoted.total_fee,
    }
}
