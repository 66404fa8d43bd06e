//! Call batch encoding

use alloy_json_abi::Function;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolValue;

use crate::domain::BatchRequest;
use crate::error::{MulticallError, Result};
use crate::infrastructure::abi::encode_call;
use crate::infrastructure::BytecodeTable;

/// A batch ready for execution
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    /// Aggregator creation code followed by the ABI-encoded calls
    pub payload: Bytes,
    /// The resolved function of each call, used to decode its return data
    pub functions: Vec<Function>,
    pub strict: bool,
}

/// Encode every call of `request` and append the batch to the generic
/// aggregator selected by the request's failure policy.
pub fn encode_batch(request: &BatchRequest, bytecode: &BytecodeTable) -> Result<EncodedBatch> {
    let mut targets = Vec::with_capacity(request.calls.len());
    let mut datas = Vec::with_capacity(request.calls.len());
    let mut functions = Vec::with_capacity(request.calls.len());

    for (index, call) in request.calls.iter().enumerate() {
        let source = call
            .interface
            .as_ref()
            .ok_or(MulticallError::MissingInterface { index })?;

        let encode_error = |source| MulticallError::Encode {
            index,
            function: call.function.clone(),
            source,
        };

        let interface = source.resolve().map_err(encode_error)?;
        let function = interface
            .function(&call.function, Some(call.args.len()))
            .map_err(encode_error)?;
        let data = encode_call(function, &call.args).map_err(encode_error)?;

        tracing::trace!(
            index,
            target = %call.target,
            function = %function.signature(),
            "encoded call"
        );

        targets.push(call.target);
        datas.push(data);
        functions.push(function.clone());
    }

    let payload = append_to_bytecode(
        bytecode.aggregator(request.strict),
        &encode_aggregate_input(targets, datas),
    );

    Ok(EncodedBatch {
        payload,
        functions,
        strict: request.strict,
    })
}

/// ABI-encode `(address[] targets, bytes[] datas)` as parameters
pub fn encode_aggregate_input(targets: Vec<Address>, datas: Vec<Bytes>) -> Vec<u8> {
    (targets, datas).abi_encode_params()
}

/// Concatenate creation code and its constructor arguments
pub(crate) fn append_to_bytecode(bytecode: &Bytes, input: &[u8]) -> Bytes {
    let mut payload = Vec::with_capacity(bytecode.len() + input.len());
    payload.extend_from_slice(bytecode);
    payload.extend_from_slice(input);
    payload.into()
}
