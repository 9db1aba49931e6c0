pub mod calculator;
pub mod reconcile;
pub mod schedule;

pub use calculator::{calculate_fees, quote, FeeBreakdown, FeeQuote};
pub use reconcile::{reconcile, FeeMatch, Reconciliation};
pub use schedule::{FeeSchedule, FeeTier, ScheduleError};
