//! Ethereum infrastructure - read-only call execution over Alloy providers

mod provider;

pub use provider::{create_executor, AlloyExecutor, CallExecutor, ProviderConfig};
