//! Everything that talks to the booking assistant backend.

mod client;
mod error;
pub mod public;
pub use client::{ChatBackend, HttpBackend};
pub use error::{ExchangeError, FailureKind};
