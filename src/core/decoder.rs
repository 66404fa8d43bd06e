//! Aggregator response decoding

use alloy_dyn_abi::FunctionExt;
use alloy_json_abi::Function;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;

use crate::domain::{AggregatedResponse, BatchOutput, DecodedResult};
use crate::error::{MulticallError, Result};

/// Split the response into `(uint256 blockNumber, bytes[] returnData)`
pub fn decode_aggregated(response: &[u8]) -> Result<AggregatedResponse> {
    let (block_number, raw_results) = <(U256, Vec<Bytes>)>::abi_decode_params(response)
        .map_err(|e| MulticallError::Decode(e.to_string()))?;

    Ok(AggregatedResponse {
        block_number: block_number_to_u64(block_number)?,
        raw_results,
    })
}

/// Decode every call's return data against its function.
///
/// In a non-strict batch, empty return data means the inner call failed and
/// yields [`DecodedResult::Null`]. Any decoding failure aborts the batch.
pub fn decode_results(response: &[u8], functions: &[Function], strict: bool) -> Result<BatchOutput> {
    let AggregatedResponse {
        block_number,
        raw_results,
    } = decode_aggregated(response)?;

    if raw_results.len() != functions.len() {
        return Err(MulticallError::Decode(format!(
            "expected {} results, aggregator returned {}",
            functions.len(),
            raw_results.len()
        )));
    }

    let results = functions
        .iter()
        .zip(&raw_results)
        .enumerate()
        .map(|(index, (function, data))| {
            if !strict && data.is_empty() {
                return Ok(DecodedResult::Null);
            }
            function
                .abi_decode_output(data)
                .map(DecodedResult::from_outputs)
                .map_err(|e| {
                    MulticallError::Decode(format!(
                        "call #{index} `{}`: {e}",
                        function.signature()
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchOutput {
        block_number,
        results,
    })
}

pub(crate) fn block_number_to_u64(block_number: U256) -> Result<u64> {
    if block_number > U256::from(u64::MAX) {
        return Err(MulticallError::Decode(format!(
            "block number {block_number} does not fit in 64 bits"
        )));
    }
    Ok(block_number.to::<u64>())
}
