//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - ABI interfaces, encoding and decoding using alloy-json-abi/alloy-dyn-abi
//! - The Alloy-backed read-only call executor
//! - The aggregator bytecode asset table

pub mod abi;
pub mod bytecode;
pub mod ethereum;

pub use bytecode::BytecodeTable;
pub use ethereum::{create_executor, AlloyExecutor, CallExecutor, ProviderConfig};
