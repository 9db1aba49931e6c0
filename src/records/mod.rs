pub mod countdown;
pub mod display;
pub mod types;

pub use countdown::Countdown;
pub use display::{display_total, display_total_json, format_total, DisplayTotal};
pub use types::{
    text_from_json, timestamp_from_json, Deal, DealEnvelope, DealsEnvelope, Milestone, Proposal,
    ProposalEnvelope, ProposalsEnvelope, Transaction, TransactionsEnvelope,
};
