use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown in place of an amount that could not be read.
pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ngn,
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub fn glyph(&self) -> &'static str {
        match self {
            Currency::Ngn => "₦",
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NGN" => Ok(Currency::Ngn),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "EUR" => Ok(Currency::Eur),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rounds to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount for display: glyph prefix, thousands grouping, two
/// decimal places. `format_amount(dec!(1050), Currency::Ngn)` is `₦1,050.00`.
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    let mut cents = round_cents(amount);
    let negative = cents.is_sign_negative() && !cents.is_zero();
    cents = cents.abs();
    cents.rescale(2);

    let text = cents.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        currency.glyph(),
        group_thousands(whole),
        fraction
    )
}

/// Inserts `,` every three digits from the right.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
