pub mod client;

pub use client::{BackendError, EscrowClient, CSRF_HEADER};
