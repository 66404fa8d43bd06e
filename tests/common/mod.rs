//! In-process stand-in for a node executing deployless aggregator calls.
//!
//! Payloads are routed by their bytecode prefix, decoded the way the real
//! aggregator contracts read their constructor arguments, and answered from
//! canned contract handlers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{keccak256, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use anyhow::{bail, Result};
use multicall::{BytecodeTable, CallExecutor};

pub const MULTI_CALL: [u8; 2] = [0xc0, 0x01];
pub const MULTI_CALL_STRICT: [u8; 2] = [0xc0, 0x02];
pub const BALANCE_GETTER: [u8; 2] = [0xc0, 0x03];
pub const BALANCE_AND_ALLOWANCE_GETTER: [u8; 2] = [0xc0, 0x04];

pub fn bytecode() -> Arc<BytecodeTable> {
    Arc::new(BytecodeTable {
        multi_call: Bytes::from_static(&MULTI_CALL),
        multi_call_strict: Bytes::from_static(&MULTI_CALL_STRICT),
        token_balance_getter: Bytes::from_static(&BALANCE_GETTER),
        token_balance_and_allowance_getter: Bytes::from_static(&BALANCE_AND_ALLOWANCE_GETTER),
    })
}

/// Answers one calldata blob; `None` means the call reverted
pub type Handler = Arc<dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync>;

pub fn is_call(data: &[u8], signature: &str) -> bool {
    data.len() >= 4 && data[..4] == keccak256(signature.as_bytes())[..4]
}

/// A token answering `totalSupply`, `decimals`, `symbol` and `balanceOf`
pub fn erc20(symbol: &'static str, total_supply: u64, holders: &[(Address, u64)]) -> Handler {
    let holders: HashMap<Address, U256> = holders
        .iter()
        .map(|(holder, amount)| (*holder, U256::from(*amount)))
        .collect();

    Arc::new(move |data: &[u8]| {
        if is_call(data, "totalSupply()") {
            Some(U256::from(total_supply).abi_encode())
        } else if is_call(data, "decimals()") {
            Some(U256::from(18).abi_encode())
        } else if is_call(data, "symbol()") {
            Some(symbol.to_string().abi_encode())
        } else if is_call(data, "balanceOf(address)") {
            let holder = Address::abi_decode(&data[4..]).ok()?;
            Some(holders.get(&holder).copied().unwrap_or_default().abi_encode())
        } else {
            None
        }
    })
}

/// A contract whose every call reverts
pub fn reverter() -> Handler {
    Arc::new(|_: &[u8]| None)
}

/// A contract answering every call with `output` verbatim
pub fn fixed(output: Vec<u8>) -> Handler {
    Arc::new(move |_: &[u8]| Some(output.clone()))
}

#[derive(Default)]
pub struct MockChain {
    block_number: u64,
    contracts: HashMap<Address, Handler>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    unreachable: bool,
    requests: Mutex<Vec<(Address, Bytes)>>,
    inner_calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockChain {
    pub fn new(block_number: u64) -> Self {
        Self {
            block_number,
            ..Self::default()
        }
    }

    /// A node that refuses every request
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_contract(mut self, address: Address, handler: Handler) -> Self {
        self.contracts.insert(address, handler);
        self
    }

    pub fn with_balance(mut self, token: Address, owner: Address, amount: u64) -> Self {
        self.balances.insert((token, owner), U256::from(amount));
        self
    }

    pub fn with_allowance(
        mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u64,
    ) -> Self {
        self.allowances
            .insert((token, owner, spender), U256::from(amount));
        self
    }

    /// Number of `eth_call`s received
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(from, input)` of every `eth_call` received
    pub fn requests(&self) -> Vec<(Address, Bytes)> {
        self.requests.lock().unwrap().clone()
    }

    /// `(target, calldata)` of every inner call the aggregator dispatched
    pub fn inner_calls(&self) -> Vec<(Address, Bytes)> {
        self.inner_calls.lock().unwrap().clone()
    }

    fn aggregate(&self, input: &[u8], strict: bool) -> Result<Bytes> {
        let (targets, datas) = <(Vec<Address>, Vec<Bytes>)>::abi_decode_params(input)?;
        if targets.len() != datas.len() {
            bail!("targets and datas differ in length");
        }

        let mut results = Vec::with_capacity(targets.len());
        for (target, data) in targets.into_iter().zip(datas) {
            self.inner_calls.lock().unwrap().push((target, data.clone()));
            let output = self.contracts.get(&target).and_then(|handler| handler(&data));
            match output {
                Some(output) => results.push(Bytes::from(output)),
                None if strict => bail!("execution reverted: call to {target} failed"),
                None => results.push(Bytes::new()),
            }
        }

        Ok((U256::from(self.block_number), results)
            .abi_encode_params()
            .into())
    }

    fn balances(&self, input: &[u8]) -> Result<Bytes> {
        let (tokens, owner) = <(Vec<Address>, Address)>::abi_decode_params(input)?;
        let balances: Vec<U256> = tokens
            .iter()
            .map(|token| self.balances.get(&(*token, owner)).copied().unwrap_or_default())
            .collect();

        Ok((U256::from(self.block_number), balances)
            .abi_encode_params()
            .into())
    }

    fn balances_and_allowances(&self, input: &[u8]) -> Result<Bytes> {
        let (tokens, owner, spender) =
            <(Vec<Address>, Address, Address)>::abi_decode_params(input)?;
        let pairs: Vec<[U256; 2]> = tokens
            .iter()
            .map(|token| {
                [
                    self.balances.get(&(*token, owner)).copied().unwrap_or_default(),
                    self.allowances
                        .get(&(*token, owner, spender))
                        .copied()
                        .unwrap_or_default(),
                ]
            })
            .collect();

        Ok((U256::from(self.block_number), pairs)
            .abi_encode_params()
            .into())
    }
}

#[async_trait::async_trait]
impl CallExecutor for MockChain {
    async fn simulate_call(&self, from: Address, data: Bytes) -> Result<Bytes> {
        self.requests.lock().unwrap().push((from, data.clone()));
        if self.unreachable {
            bail!("connection refused");
        }
        if data.len() < 2 {
            bail!("empty creation code");
        }

        let (prefix, input) = data.split_at(2);
        match [prefix[0], prefix[1]] {
            MULTI_CALL => self.aggregate(input, false),
            MULTI_CALL_STRICT => self.aggregate(input, true),
            BALANCE_GETTER => self.balances(input),
            BALANCE_AND_ALLOWANCE_GETTER => self.balances_and_allowances(input),
            _ => bail!("unknown creation code"),
        }
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}
