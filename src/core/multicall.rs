//! The batch facade: normalize, encode, execute once, decode

use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use serde_json::Value;

use super::decoder::decode_results;
use super::encoder::encode_batch;
use super::tokens;
use super::{AGGREGATOR_SENDER, TOKEN_GETTER_SENDER};
use crate::domain::{
    BatchInput, BatchOutput, BatchRequest, CallDescriptor, InterfaceSource, TokenBalances,
    TokenBalancesAndAllowances,
};
use crate::error::{MulticallError, Result};
use crate::infrastructure::{BytecodeTable, CallExecutor};

/// Batches contract reads into single deployless calls.
///
/// Every operation performs exactly one call through the executor. Nothing
/// is cached or retried, and independent batches share no mutable state.
pub struct MultiCall<E: ?Sized> {
    executor: Arc<E>,
    bytecode: Arc<BytecodeTable>,
}

impl<E: ?Sized> Clone for MultiCall<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            bytecode: Arc::clone(&self.bytecode),
        }
    }
}

impl<E: CallExecutor + ?Sized> MultiCall<E> {
    pub fn new(executor: Arc<E>, bytecode: Arc<BytecodeTable>) -> Self {
        Self { executor, bytecode }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Batch calls that share `interface` unless they name their own
    pub async fn batch_call_with(
        &self,
        interface: impl Into<InterfaceSource>,
        calls: Vec<CallDescriptor>,
        strict: bool,
    ) -> Result<BatchOutput> {
        self.batch_call_input(BatchInput::SharedInterface {
            interface: interface.into(),
            calls,
            strict,
        })
        .await
    }

    /// Batch calls that each carry their own interface
    pub async fn batch_call(&self, calls: Vec<CallDescriptor>, strict: bool) -> Result<BatchOutput> {
        self.batch_call_input(BatchInput::PerCallInterface { calls, strict })
            .await
    }

    pub async fn batch_call_input(&self, input: BatchInput) -> Result<BatchOutput> {
        self.execute(&input.to_request()).await
    }

    /// Batch from loosely typed positional arguments, see
    /// [`BatchInput::from_positional`] for how they are classified
    pub async fn batch_call_json(
        &self,
        arg0: &Value,
        arg1: Option<&Value>,
        arg2: Option<bool>,
    ) -> Result<BatchOutput> {
        let input = BatchInput::from_positional(arg0, arg1, arg2)?;
        self.batch_call_input(input).await
    }

    /// Encode, execute and decode a normalized request
    pub async fn execute(&self, request: &BatchRequest) -> Result<BatchOutput> {
        let batch = encode_batch(request, &self.bytecode)?;
        tracing::debug!(
            calls = request.calls.len(),
            strict = request.strict,
            payload_bytes = batch.payload.len(),
            "executing batch"
        );

        let response = self.simulate(AGGREGATOR_SENDER, batch.payload).await?;
        let output = decode_results(&response, &batch.functions, batch.strict)?;

        tracing::debug!(
            block = output.block_number,
            failed = output.results.iter().filter(|r| r.is_null()).count(),
            "batch decoded"
        );
        Ok(output)
    }

    /// ERC20 balances of `account` for every token, at one block
    pub async fn get_balances(
        &self,
        tokens: &[Address],
        account: Address,
    ) -> Result<(u64, TokenBalances)> {
        let payload = tokens::encode_balances(&self.bytecode, tokens, account);
        tracing::debug!(tokens = tokens.len(), %account, "fetching token balances");

        let response = self.simulate(TOKEN_GETTER_SENDER, payload).await?;
        tokens::decode_balances(&response, tokens)
    }

    /// ERC20 balances of `owner` and allowances granted to `spender`
    pub async fn get_balances_and_allowances(
        &self,
        tokens: &[Address],
        owner: Address,
        spender: Address,
    ) -> Result<(u64, TokenBalancesAndAllowances)> {
        let payload = tokens::encode_balances_and_allowances(&self.bytecode, tokens, owner, spender);
        tracing::debug!(
            tokens = tokens.len(),
            %owner,
            %spender,
            "fetching token balances and allowances"
        );

        let response = self.simulate(TOKEN_GETTER_SENDER, payload).await?;
        tokens::decode_balances_and_allowances(&response, tokens)
    }

    async fn simulate(&self, from: Address, payload: Bytes) -> Result<Bytes> {
        self.executor
            .simulate_call(from, payload)
            .await
            .map_err(|err| {
                tracing::warn!(
                    endpoint = %self.executor.endpoint_name(),
                    error = %err,
                    "aggregator call failed"
                );
                MulticallError::Execution(err)
            })
    }
}
