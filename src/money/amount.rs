use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Largest principal the calculator accepts. Keeps `principal * percent`
/// well inside `Decimal`'s 96-bit mantissa.
pub const MAX_PRINCIPAL: Decimal = dec!(1000000000000000000);

/// Finest scale `Decimal` can represent.
const MAX_SCALE: u32 = 28;

const CURRENCY_GLYPHS: [char; 4] = ['₦', '$', '£', '€'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a number: {0:?}")]
    NotANumber(String),
    #[error("amount must not be negative: {0}")]
    Negative(Decimal),
    #[error("amount exceeds the supported maximum: {0}")]
    TooLarge(Decimal),
    /// Well-formed numeric text whose magnitude `Decimal` cannot hold.
    #[error("amount is out of range: {0:?}")]
    OutOfRange(String),
}

impl AmountError {
    pub fn coercion(&self) -> Coercion {
        match self {
            AmountError::Empty => Coercion::Empty,
            AmountError::NotANumber(_) => Coercion::NotANumber,
            AmountError::Negative(_) => Coercion::Negative,
            AmountError::TooLarge(_) | AmountError::OutOfRange(_) => Coercion::TooLarge,
        }
    }
}

/// Why a raw amount was replaced by zero.
///
/// The legacy calculator treated anything unparseable as a zero-amount deal.
/// That behavior is kept, but every replacement is reported through this type
/// so callers can surface it instead of quoting a silent zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    Empty,
    NotANumber,
    Negative,
    TooLarge,
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Coercion::Empty => "empty input",
            Coercion::NotANumber => "not a number",
            Coercion::Negative => "negative amount",
            Coercion::TooLarge => "amount too large",
        };
        f.write_str(reason)
    }
}

/// A validated, non-negative deal principal in the platform's base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Principal(Decimal);

impl Principal {
    pub const ZERO: Principal = Principal(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, AmountError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AmountError::Negative(amount));
        }
        if amount > MAX_PRINCIPAL {
            return Err(AmountError::TooLarge(amount));
        }
        // Normalizes "-0" to 0.
        Ok(Self(amount.abs()))
    }

    /// Strict parse of user-entered text. See [`parse_decimal`] for the
    /// accepted notation.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        Self::new(parse_decimal(raw)?)
    }

    /// Lenient conversion: invalid amounts become zero and the reason is
    /// returned next to it.
    pub fn coerce(amount: Decimal) -> (Self, Option<Coercion>) {
        match Self::new(amount) {
            Ok(principal) => (principal, None),
            Err(err) => (Self::ZERO, Some(err.coercion())),
        }
    }

    /// Lenient parse of user-entered text, the counterpart of the web
    /// calculator's `parseFloat(value) || 0`.
    pub fn coerce_str(raw: &str) -> (Self, Option<Coercion>) {
        match Self::parse(raw) {
            Ok(principal) => (principal, None),
            Err(err) => (Self::ZERO, Some(err.coercion())),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Principal {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Principal {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for Decimal {
    fn from(value: Principal) -> Self {
        value.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Parses a decimal amount as users and the backend write it.
///
/// Accepts surrounding whitespace, an optional sign, an optional currency
/// glyph (`₦`, `$`, `£`, `€`), `,` thousands separators, and plain or
/// scientific notation. Signs are kept; rejecting negatives is the caller's
/// business.
pub fn parse_decimal(raw: &str) -> Result<Decimal, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let unsigned = unsigned.trim_start_matches(CURRENCY_GLYPHS).trim_start();
    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();

    if cleaned.is_empty() || cleaned.starts_with(['-', '+']) {
        return Err(AmountError::NotANumber(raw.to_string()));
    }

    let value = match Decimal::from_str(&cleaned) {
        Ok(value) => value,
        Err(_) => parse_scientific(&cleaned, raw)?,
    };

    Ok(if negative { -value } else { value })
}

/// Digits with at most one `.` and at least one digit.
fn is_plain_number(text: &str) -> bool {
    let (int, frac) = text.split_once('.').unwrap_or((text, ""));
    !(int.is_empty() && frac.is_empty())
        && int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
}

/// Applies the exponent one power of ten at a time so that overflow is
/// reported as out of range and underflow truncates towards zero.
fn parse_scientific(cleaned: &str, raw: &str) -> Result<Decimal, AmountError> {
    let not_a_number = || AmountError::NotANumber(raw.to_string());
    let out_of_range = || AmountError::OutOfRange(raw.to_string());

    let (mantissa, exponent) = match cleaned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent),
        None => (cleaned, "0"),
    };
    let exponent_digits = exponent.strip_prefix(['-', '+']).unwrap_or(exponent);
    if !is_plain_number(mantissa)
        || exponent_digits.is_empty()
        || !exponent_digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(not_a_number());
    }

    // Only too many integer digits can fail here.
    let mut value = Decimal::from_str(mantissa).map_err(|_| out_of_range())?;
    let shrinking = exponent.starts_with('-');
    let exponent_digits = exponent_digits.trim_start_matches('0');
    let mut steps = if exponent_digits.is_empty() {
        0
    } else {
        exponent_digits.parse::<u64>().unwrap_or(u64::MAX)
    };

    while steps > 0 && !value.is_zero() {
        value = if !shrinking {
            value.checked_mul(Decimal::TEN).ok_or_else(out_of_range)?
        } else if value.scale() >= MAX_SCALE {
            Decimal::from_i128_with_scale(value.mantissa() / 10, MAX_SCALE)
        } else {
            value.checked_div(Decimal::TEN).unwrap_or(Decimal::ZERO)
        };
        steps -= 1;
    }
    Ok(value)
}

/// Reads an amount out of loosely typed JSON: numbers and numeric strings
/// are accepted, everything else (null, bools, objects, garbage text) is
/// `None`.
pub fn amount_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()).ok(),
        Value::String(s) => parse_decimal(s).ok(),
        _ => None,
    }
}

/// `deserialize_with` helper for backend amount fields. Never fails: a
/// malformed amount deserializes to `None`.
pub fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_json))
}
