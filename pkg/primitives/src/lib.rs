//! Small shared value types used across the PCZT crates

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod block_height;
mod bytes;
pub mod util;

pub use block_height::BlockHeight;
pub use bytes::Bytes32;
