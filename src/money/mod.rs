pub mod amount;
pub mod format;

pub use amount::{
    amount_from_json, deserialize_lenient_amount, parse_decimal, AmountError, Coercion,
    Principal, MAX_PRINCIPAL,
};
pub use format::{format_amount, round_cents, Currency, UnknownCurrency, PLACEHOLDER};
