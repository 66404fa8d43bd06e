//! Error types for batch construction, execution and decoding

use crate::infrastructure::abi::AbiError;

/// Errors surfaced by a batch invocation.
///
/// `InvalidArgument`, `MissingInterface` and `Encode` are always raised
/// before the aggregator is executed.
#[derive(Debug, thiserror::Error)]
pub enum MulticallError {
    /// Malformed overload usage or an unparseable call description
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A call reached the encoder without an interface source
    #[error("call #{index} has no interface source")]
    MissingInterface { index: usize },

    /// Call data for one call could not be built
    #[error("failed to encode call #{index} `{function}`: {source}")]
    Encode {
        index: usize,
        function: String,
        #[source]
        source: AbiError,
    },

    /// The simulated aggregator call failed (transport error or outer revert)
    #[error("aggregator call failed: {0}")]
    Execution(#[source] anyhow::Error),

    /// The aggregator response does not match the expected shape
    #[error("failed to decode aggregator response: {0}")]
    Decode(String),

    /// The bytecode asset table could not be loaded
    #[error("bytecode assets: {0}")]
    Asset(String),
}

pub type Result<T, E = MulticallError> = std::result::Result<T, E>;
