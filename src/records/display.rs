use rust_decimal::Decimal;
use serde_json::Value;

use crate::money::{amount_from_json, format_amount, Currency, PLACEHOLDER};
use crate::records::types::{Deal, Proposal, Transaction};

/// Principal plus the persisted escrow fee. A missing fee counts as zero; a
/// sum that would overflow falls back to the principal alone.
pub fn display_total(principal: Decimal, escrow_fee: Option<Decimal>) -> Decimal {
    principal
        .checked_add(escrow_fee.unwrap_or_default())
        .unwrap_or(principal)
}

/// [`display_total`] over loosely typed JSON values. `None` when the principal
/// itself is unreadable; an unreadable fee is treated as absent.
pub fn display_total_json(principal: &Value, escrow_fee: Option<&Value>) -> Option<Decimal> {
    let principal = amount_from_json(principal)?;
    Some(display_total(principal, escrow_fee.and_then(amount_from_json)))
}

/// Formatted total, or [`PLACEHOLDER`] when there is nothing to show.
pub fn format_total(total: Option<Decimal>, currency: Currency) -> String {
    match total {
        Some(total) => format_amount(total, currency),
        None => PLACEHOLDER.to_string(),
    }
}

/// Records whose displayed amount is principal plus the persisted escrow fee.
pub trait DisplayTotal {
    fn principal(&self) -> Option<Decimal>;

    fn escrow_fee(&self) -> Option<Decimal>;

    fn display_total(&self) -> Option<Decimal> {
        self.principal()
            .map(|principal| display_total(principal, self.escrow_fee()))
    }

    fn formatted_total(&self, currency: Currency) -> String {
        format_total(self.display_total(), currency)
    }
}

impl DisplayTotal for Deal {
    fn principal(&self) -> Option<Decimal> {
        self.total_amount
    }

    fn escrow_fee(&self) -> Option<Decimal> {
        self.escrow_fee
    }
}

impl DisplayTotal for Proposal {
    fn principal(&self) -> Option<Decimal> {
        self.total_amount
    }

    fn escrow_fee(&self) -> Option<Decimal> {
        self.escrow_fee
    }
}

impl DisplayTotal for Transaction {
    fn principal(&self) -> Option<Decimal> {
        self.amount
    }

    fn escrow_fee(&self) -> Option<Decimal> {
        self.escrow_fee
    }
}
