use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::fees::schedule::FeeSchedule;
use crate::money::{round_cents, Coercion, Principal};

/// Fees owed on a principal under one tier of the schedule.
///
/// The three amounts are each computed straight from their percentage; none
/// is derived from the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub principal: Decimal,
    pub buyer_fee: Decimal,
    pub seller_fee: Decimal,
    pub total_fee: Decimal,
    pub buyer_fee_percent: Decimal,
    pub seller_fee_percent: Decimal,
    pub total_fee_percent: Decimal,
}

impl FeeBreakdown {
    /// Same breakdown with every amount rounded to cents. Percentages are left
    /// untouched.
    pub fn rounded(&self) -> Self {
        Self {
            principal: round_cents(self.principal),
            buyer_fee: round_cents(self.buyer_fee),
            seller_fee: round_cents(self.seller_fee),
            total_fee: round_cents(self.total_fee),
            ..*self
        }
    }

    /// What the buyer funds: principal plus the buyer's share.
    pub fn buyer_pays(&self) -> Decimal {
        self.principal + self.buyer_fee
    }

    /// What the seller is paid out: principal less the seller's share.
    pub fn seller_receives(&self) -> Decimal {
        self.principal - self.seller_fee
    }
}

/// A fee quote for raw input, with the coercion applied to it (if any).
///
/// Quotes are advisory. They are never written back over an `escrowFee`
/// the backend already persisted on a deal or proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub input: Option<String>,
    pub tier: usize,
    pub breakdown: FeeBreakdown,
    pub coercion: Option<Coercion>,
}

impl FeeQuote {
    pub fn was_coerced(&self) -> bool {
        self.coercion.is_some()
    }
}

fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

impl FeeSchedule {
    pub fn calculate(&self, principal: Principal) -> FeeBreakdown {
        let tier = self.tier_for(principal);
        let amount = principal.amount();

        FeeBreakdown {
            principal: amount,
            buyer_fee: percent_of(amount, tier.buyer_fee_percent),
            seller_fee: percent_of(amount, tier.seller_fee_percent),
            total_fee: percent_of(amount, tier.total_fee_percent),
            buyer_fee_percent: tier.buyer_fee_percent,
            seller_fee_percent: tier.seller_fee_percent,
            total_fee_percent: tier.total_fee_percent,
        }
    }

    fn quote_principal(
        &self,
        input: Option<String>,
        principal: Principal,
        coercion: Option<Coercion>,
    ) -> FeeQuote {
        if let Some(reason) = coercion {
            warn!(
                input = input.as_deref().unwrap_or_default(),
                %reason,
                "fee quote input coerced to zero"
            );
        }
        let breakdown = self.calculate(principal);
        let tier = self.tier_index(principal);
        debug!(%principal, tier, total_fee = %breakdown.total_fee, "quoted escrow fee");

        FeeQuote {
            input,
            tier,
            breakdown,
            coercion,
        }
    }

    /// Quotes user-entered text. Unreadable or negative input is quoted as a
    /// zero principal and flagged on the returned quote.
    pub fn quote_str(&self, raw: &str) -> FeeQuote {
        let (principal, coercion) = Principal::coerce_str(raw);
        self.quote_principal(Some(raw.to_string()), principal, coercion)
    }

    pub fn quote_decimal(&self, amount: Decimal) -> FeeQuote {
        let (principal, coercion) = Principal::coerce(amount);
        self.quote_principal(None, principal, coercion)
    }

    /// Quotes many inputs in parallel, keeping input order.
    pub fn quote_many<S: AsRef<str> + Sync>(&self, inputs: &[S]) -> Vec<FeeQuote> {
        inputs
            .par_iter()
            .map(|raw| self.quote_str(raw.as_ref()))
            .collect()
    }
}

/// Fees for `principal` under the standard schedule.
pub fn calculate_fees(principal: Principal) -> FeeBreakdown {
    FeeSchedule::standard().calculate(principal)
}

/// Lenient quote of raw text under the standard schedule.
pub fn quote(raw: &str) -> FeeQuote {
    FeeSchedule::standard().quote_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounded_keeps_percentages() {
        let breakdown = calculate_fees(Principal::new(dec!(1234.567)).unwrap());
        let rounded = breakdown.rounded();
        assert_eq!(rounded.principal, dec!(1234.57));
        assert_eq!(rounded.buyer_fee, dec!(61.73));
        assert_eq!(rounded.total_fee, dec!(123.46));
        assert_eq!(rounded.total_fee_percent, breakdown.total_fee_percent);
    }

    #[test]
    fn test_buyer_pays_and_seller_receives() {
        let breakdown = calculate_fees(Principal::new(dec!(2000)).unwrap());
        assert_eq!(breakdown.buyer_pays(), dec!(2100));
        assert_eq!(breakdown.seller_receives(), dec!(1900));
    }

    #[test]
    fn test_quote_many_keeps_order() {
        let quotes = FeeSchedule::standard().quote_many(&["2000", "oops", "3000000"]);
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].breakdown.total_fee, dec!(200));
        assert_eq!(quotes[1].coercion, Some(Coercion::NotANumber));
        assert_eq!(quotes[2].tier, 1);
    }
}
