//! Funding a [`Pczt`] from wallet state
//!
//! [`fund_pczt`] selects notes for an address largest first, adds spends until the configured
//! fee is covered and sends any surplus back as change. The wallet itself is abstracted by the
//! [`Wallet`] trait.

#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

mod config;
mod error;
mod fund;
mod wallet;

#[cfg(any(test, feature = "test-api"))]
pub mod test_api;

pub use config::{FundingConfig, DEFAULT_FEE};
pub use error::{Error, Result};
pub use fund::{add_output_pczt, fund_pczt, key_provenance};
pub use wallet::{KeyMetadata, OutPoint, SpendableNote, SpendingKeys, Wallet, Witnesses};

#[doc(no_inline)]
pub use pczt::Pczt;
