pub mod backend;
pub mod cli;
pub mod config;
pub mod fees;
pub mod money;
pub mod records;
pub mod report;
pub mod util;

pub use fees::{calculate_fees, quote, FeeBreakdown, FeeQuote, FeeSchedule};
pub use money::{Coercion, Currency, Principal};
pub use records::{display_total, DisplayTotal};
