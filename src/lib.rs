//! Batch many read-only contract calls into a single deployless `eth_call`.
//!
//! Calls are ABI-encoded, appended to an aggregator contract's creation code
//! and simulated once; the aggregator returns the block height and every
//! call's return data, which is decoded back into typed values.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use multicall::{create_executor, BytecodeTable, CallDescriptor, MultiCall, ProviderConfig};
//!
//! let executor = create_executor(ProviderConfig::Http("http://localhost:8545".into())).await?;
//! let bytecode = BytecodeTable::load("bytecode.json")?;
//! let multicall = MultiCall::new(Arc::new(executor), Arc::new(bytecode));
//!
//! let erc20 = vec![serde_json::json!("function totalSupply() view returns (uint256)")];
//! let token = "0x00000000000000000000000000000000000000aa".parse()?;
//! let output = multicall
//!     .batch_call_with(erc20, vec![CallDescriptor::new(token, "totalSupply")], false)
//!     .await?;
//! println!("{}", output.to_json());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use crate::core::{MultiCall, AGGREGATOR_SENDER, TOKEN_GETTER_SENDER};
pub use crate::domain::{
    AggregatedResponse, BatchInput, BatchOutput, BatchRequest, CallDescriptor, DecodedResult,
    InterfaceSource, TokenBalanceAndAllowance, TokenBalances, TokenBalancesAndAllowances,
};
pub use crate::error::{MulticallError, Result};
pub use crate::infrastructure::abi::{CallArg, ContractInterface};
pub use crate::infrastructure::{
    create_executor, AlloyExecutor, BytecodeTable, CallExecutor, ProviderConfig,
};
