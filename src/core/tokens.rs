//! Fixed-shape token balance and allowance batches
//!
//! These use dedicated aggregators rather than the generic one: the token
//! list and accounts are constructor arguments, and results come back in the
//! same order as the token list.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;

use super::decoder::block_number_to_u64;
use super::encoder::append_to_bytecode;
use crate::domain::{TokenBalanceAndAllowance, TokenBalances, TokenBalancesAndAllowances};
use crate::error::{MulticallError, Result};
use crate::infrastructure::BytecodeTable;

/// `getter ++ abi.encode(address[] tokens, address owner)`
pub fn encode_balances(bytecode: &BytecodeTable, tokens: &[Address], owner: Address) -> Bytes {
    let input = (tokens.to_vec(), owner).abi_encode_params();
    append_to_bytecode(&bytecode.token_balance_getter, &input)
}

/// `getter ++ abi.encode(address[] tokens, address owner, address spender)`
pub fn encode_balances_and_allowances(
    bytecode: &BytecodeTable,
    tokens: &[Address],
    owner: Address,
    spender: Address,
) -> Bytes {
    let input = (tokens.to_vec(), owner, spender).abi_encode_params();
    append_to_bytecode(&bytecode.token_balance_and_allowance_getter, &input)
}

/// Decode `(uint256 blockNumber, uint256[] balances)` and key it by token
pub fn decode_balances(response: &[u8], tokens: &[Address]) -> Result<(u64, TokenBalances)> {
    let (block_number, balances) = <(U256, Vec<U256>)>::abi_decode_params(response)
        .map_err(|e| MulticallError::Decode(e.to_string()))?;
    ensure_len(tokens.len(), balances.len())?;

    let balances = tokens.iter().copied().zip(balances).collect();
    Ok((block_number_to_u64(block_number)?, balances))
}

/// Decode `(uint256 blockNumber, uint256[2][] pairs)` and key it by token
pub fn decode_balances_and_allowances(
    response: &[u8],
    tokens: &[Address],
) -> Result<(u64, TokenBalancesAndAllowances)> {
    let (block_number, pairs) = <(U256, Vec<[U256; 2]>)>::abi_decode_params(response)
        .map_err(|e| MulticallError::Decode(e.to_string()))?;
    ensure_len(tokens.len(), pairs.len())?;

    let entries = tokens
        .iter()
        .copied()
        .zip(pairs)
        .map(|(token, [balance, allowance])| (token, TokenBalanceAndAllowance { balance, allowance }))
        .collect();
    Ok((block_number_to_u64(block_number)?, entries))
}

fn ensure_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(MulticallError::Decode(format!(
            "expected {expected} token entries, aggregator returned {got}"
        )));
    }
    Ok(())
}
