//! Aggregator bytecode asset table
//!
//! The four aggregator contracts are never deployed: their creation bytecode
//! is sent as the input of an `eth_call` without a `to` address, followed by
//! the ABI-encoded batch. The blobs are versioned assets loaded once at
//! startup; changing any of them changes the wire contract with the decoder.

use std::fs;
use std::path::Path;

use alloy_primitives::Bytes;
use serde::Deserialize;

use crate::error::{MulticallError, Result};

/// Creation bytecode for every aggregator variant.
///
/// Deserialized from a JSON object of hex strings keyed by contract name.
/// Unknown keys are ignored so newer asset files stay loadable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BytecodeTable {
    /// Generic aggregator; a reverting inner call yields empty return data
    #[serde(rename = "MultiCall")]
    pub multi_call: Bytes,
    /// Generic aggregator; a reverting inner call reverts the whole batch
    #[serde(rename = "MultiCallStrict")]
    pub multi_call_strict: Bytes,
    /// `(address[] tokens, address owner)` -> `(uint256, uint256[])`
    #[serde(rename = "MultiTokenBalanceGetter")]
    pub token_balance_getter: Bytes,
    /// `(address[] tokens, address owner, address spender)` -> `(uint256, uint256[2][])`
    #[serde(rename = "MultiTokenBalanceAndAllowanceGetter")]
    pub token_balance_and_allowance_getter: Bytes,
}

impl BytecodeTable {
    /// Parse an asset table from its JSON form
    pub fn from_json_str(content: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(content)
            .map_err(|e| MulticallError::Asset(format!("invalid bytecode table: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    /// Load an asset table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| MulticallError::Asset(format!("read {}: {e}", path.display())))?;
        let table = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded aggregator bytecode table");
        Ok(table)
    }

    /// Generic aggregator bytecode for the requested failure policy
    pub fn aggregator(&self, strict: bool) -> &Bytes {
        if strict {
            &self.multi_call_strict
        } else {
            &self.multi_call
        }
    }

    fn validate(&self) -> Result<()> {
        let blobs = [
            ("MultiCall", &self.multi_call),
            ("MultiCallStrict", &self.multi_call_strict),
            ("MultiTokenBalanceGetter", &self.token_balance_getter),
            (
                "MultiTokenBalanceAndAllowanceGetter",
                &self.token_balance_and_allowance_getter,
            ),
        ];
        match blobs.iter().find(|(_, code)| code.is_empty()) {
            Some((name, _)) => Err(MulticallError::Asset(format!("`{name}` bytecode is empty"))),
            None => Ok(()),
        }
    }
}
