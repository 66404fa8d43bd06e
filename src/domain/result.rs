//! Batch results

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, U256};
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::infrastructure::abi::value_to_json;

/// The aggregator's raw answer: block height plus one return blob per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResponse {
    pub block_number: u64,
    pub raw_results: Vec<Bytes>,
}

/// The decoded outcome of one call.
///
/// A function with exactly one return value yields [`DecodedResult::Value`];
/// any other arity (including none) yields [`DecodedResult::Values`] in
/// declaration order. [`DecodedResult::Null`] only appears in non-strict
/// batches, for calls that reverted or returned nothing; it cannot be told
/// apart from a call that legitimately returned empty data.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    Null,
    Value(DynSolValue),
    Values(Vec<DynSolValue>),
}

impl DecodedResult {
    /// Apply the single-value unwrapping policy to decoded return values
    pub fn from_outputs(mut values: Vec<DynSolValue>) -> Self {
        match values.len() {
            1 => values.pop().map_or(DecodedResult::Null, DecodedResult::Value),
            _ => DecodedResult::Values(values),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DecodedResult::Null)
    }

    pub fn as_value(&self) -> Option<&DynSolValue> {
        match self {
            DecodedResult::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&[DynSolValue]> {
        match self {
            DecodedResult::Values(values) => Some(values),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DecodedResult::Null => Value::Null,
            DecodedResult::Value(value) => value_to_json(value),
            DecodedResult::Values(values) => Value::Array(values.iter().map(value_to_json).collect()),
        }
    }
}

/// Block height and per-call results, aligned with the request's calls
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub block_number: u64,
    pub results: Vec<DecodedResult>,
}

impl BatchOutput {
    pub fn to_json(&self) -> Value {
        json!({
            "blockNumber": self.block_number,
            "results": self.results.iter().map(DecodedResult::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Token balances keyed by token, in request order
pub type TokenBalances = IndexMap<Address, U256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalanceAndAllowance {
    pub balance: U256,
    pub allowance: U256,
}

/// Token balances and allowances keyed by token, in request order
pub type TokenBalancesAndAllowances = IndexMap<Address, TokenBalanceAndAllowance>;
