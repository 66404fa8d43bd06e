use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use multicall::config::{self, Config};
use multicall::{create_executor, BytecodeTable, MultiCall, ProviderConfig};

const DEFAULT_RPC: &str = "http://localhost:8545";

#[derive(Debug, Parser)]
#[command(
    name = "multicall",
    version,
    about = "Batch read-only contract calls into a single deployless eth_call"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    /// Config file (defaults to ~/.config/multicall/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Aggregator bytecode table (JSON)
    #[arg(long, global = true)]
    bytecode: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a batch described by a JSON file of positional arguments
    Call {
        /// JSON array `[arg0, arg1?, arg2?]`
        file: PathBuf,
    },
    /// ERC20 balances of one account
    Balances {
        #[arg(long)]
        account: Address,
        #[arg(required = true)]
        tokens: Vec<Address>,
    },
    /// ERC20 balances and allowances of one owner towards a spender
    Allowances {
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        spender: Address,
        #[arg(required = true)]
        tokens: Vec<Address>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let endpoint = endpoint_from_args_and_config(&args, &config)?;
    let bytecode_path = args
        .bytecode
        .clone()
        .or_else(|| config.bytecode.clone())
        .context("no aggregator bytecode table: pass --bytecode or set `bytecode` in the config")?;
    let bytecode = BytecodeTable::load(expand_path(&bytecode_path))?;

    tracing::debug!(endpoint = %endpoint.display(), "connecting");
    let executor = create_executor(endpoint).await?;
    let multicall = MultiCall::new(Arc::new(executor), Arc::new(bytecode));

    let output = match args.command {
        Command::Call { file } => {
            let (arg0, arg1, arg2) = read_call_file(&file)?;
            multicall
                .batch_call_json(&arg0, arg1.as_ref(), arg2)
                .await?
                .to_json()
        }
        Command::Balances { account, tokens } => {
            let (block_number, balances) = multicall.get_balances(&tokens, account).await?;
            let balances: Map<String, Value> = balances
                .into_iter()
                .map(|(token, balance)| (token.to_checksum(None), json!(balance.to_string())))
                .collect();
            json!({ "blockNumber": block_number, "balances": balances })
        }
        Command::Allowances {
            owner,
            spender,
            tokens,
        } => {
            let (block_number, entries) = multicall
                .get_balances_and_allowances(&tokens, owner, spender)
                .await?;
            let entries: Map<String, Value> = entries
                .into_iter()
                .map(|(token, entry)| {
                    (
                        token.to_checksum(None),
                        json!({
                            "balance": entry.balance.to_string(),
                            "allowance": entry.allowance.to_string(),
                        }),
                    )
                })
                .collect();
            json!({ "blockNumber": block_number, "tokens": entries })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn endpoint_from_args_and_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    let ipc = args.ipc.clone().or_else(|| config.ipc.clone());
    if let Some(ipc) = ipc {
        #[cfg(unix)]
        {
            return Ok(ProviderConfig::Ipc(expand_path(&ipc)));
        }
        #[cfg(not(unix))]
        {
            let _ = ipc;
            bail!("IPC is not supported on this platform");
        }
    }

    let ws = non_empty(args.ws.as_deref()).or_else(|| non_empty(config.ws.as_deref()));
    if let Some(ws) = ws {
        return Ok(ProviderConfig::WebSocket(ws.to_string()));
    }

    let rpc = non_empty(args.rpc.as_deref())
        .or_else(|| non_empty(config.rpc.as_deref()))
        .unwrap_or(DEFAULT_RPC);
    Ok(ProviderConfig::Http(normalize_http_endpoint(rpc)))
}

fn read_call_file(path: &Path) -> Result<(Value, Option<Value>, Option<bool>)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read call file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parse call file {}", path.display()))?;

    let Value::Array(mut items) = value else {
        bail!("call file must hold a JSON array of positional arguments");
    };
    if items.is_empty() || items.len() > 3 {
        bail!("call file must hold between one and three positional arguments");
    }

    let arg2 = match items.get(2) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(strict)) => Some(*strict),
        Some(_) => bail!("third positional argument must be the strict flag"),
    };
    items.truncate(2);
    let arg1 = if items.len() == 2 { items.pop() } else { None };
    let arg0 = items.pop().unwrap_or(Value::Null);

    Ok((arg0, arg1, arg2))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["multicall"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["call", "batch.json"]);
        Args::parse_from(argv)
    }

    #[test]
    fn test_default_endpoint() {
        let endpoint = endpoint_from_args_and_config(&args(&[]), &Config::default()).unwrap();
        assert_eq!(endpoint.display(), DEFAULT_RPC);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            rpc: Some("http://config:8545".to_string()),
            ..Config::default()
        };
        let endpoint =
            endpoint_from_args_and_config(&args(&["--rpc", "node:8545"]), &config).unwrap();
        assert_eq!(endpoint.display(), "http://node:8545");
    }

    #[test]
    fn test_ws_preferred_over_http() {
        let config = Config {
            rpc: Some("http://config:8545".to_string()),
            ws: Some("ws://config:8546".to_string()),
            ..Config::default()
        };
        let endpoint = endpoint_from_args_and_config(&args(&[]), &config).unwrap();
        assert!(matches!(endpoint, ProviderConfig::WebSocket(_)));
    }

    #[test]
    fn test_parse_balances_command() {
        let args = Args::parse_from([
            "multicall",
            "balances",
            "--account",
            "0x00000000000000000000000000000000000000bb",
            "0x00000000000000000000000000000000000000aa",
        ]);
        match args.command {
            Command::Balances { tokens, .. } => assert_eq!(tokens.len(), 1),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_normalize_http_endpoint() {
        assert_eq!(normalize_http_endpoint("localhost:8545"), "http://localhost:8545");
        assert_eq!(normalize_http_endpoint(" https://rpc.example "), "https://rpc.example");
    }
}
