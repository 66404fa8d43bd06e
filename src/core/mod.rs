//! Core batching pipeline - encoding, execution and decoding

use alloy_primitives::{address, Address};

pub mod decoder;
pub mod encoder;
mod multicall;
pub mod tokens;

pub use multicall::MultiCall;

/// Sender of generic aggregator calls
pub const AGGREGATOR_SENDER: Address = Address::ZERO;

/// Sender of token balance/allowance getter calls; the getters' bytecode
/// expects this caller
pub const TOKEN_GETTER_SENDER: Address = address!("005f644097F8f0E9f996Dca4F4F23aBB6C1Cc8b3");
