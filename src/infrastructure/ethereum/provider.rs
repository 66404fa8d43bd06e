//! Read-only call executor abstraction and its Alloy implementation
//!
//! The batch pipeline needs exactly one capability from the chain
//! connection: simulate a deployless call (`eth_call` with no `to`) and hand
//! back the raw return data.

use std::path::PathBuf;

use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use anyhow::{Context, Result};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Read-only call executor.
///
/// Implementations perform a single attempt; errors (transport failures,
/// node rejections, reverts) are returned unmodified.
#[async_trait::async_trait]
pub trait CallExecutor: Send + Sync + 'static {
    /// Execute `data` as creation code from `from` and return the output
    async fn simulate_call(&self, from: Address, data: Bytes) -> Result<Bytes>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// Call executor backed by an Alloy provider over any transport
pub struct AlloyExecutor {
    provider: DynProvider,
    endpoint: String,
}

impl AlloyExecutor {
    pub fn new(provider: DynProvider, endpoint: impl Into<String>) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
        }
    }
}

/// Create an executor from configuration
pub async fn create_executor(config: ProviderConfig) -> Result<AlloyExecutor> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
            Ok(AlloyExecutor::new(provider, url))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?
                .erased();
            Ok(AlloyExecutor::new(provider, url))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc_path = path.to_string_lossy().to_string();
            let ipc = IpcConnect::new(ipc_path);
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?
                .erased();
            Ok(AlloyExecutor::new(provider, path.display().to_string()))
        }
    }
}

#[async_trait::async_trait]
impl CallExecutor for AlloyExecutor {
    async fn simulate_call(&self, from: Address, data: Bytes) -> Result<Bytes> {
        // No `to`: the node runs `data` as creation code and returns its output
        let request = TransactionRequest::default()
            .from(from)
            .input(TransactionInput::new(data));
        let output = self
            .provider
            .call(request)
            .await
            .with_context(|| format!("eth_call against {} failed", self.endpoint))?;
        Ok(output)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
