//! Batch request model and input normalization
//!
//! A batch can be described two ways: a shared interface plus calls that
//! omit theirs, or calls that each carry their own interface. Both collapse
//! into one [`BatchRequest`]. Normalization copies the caller's descriptors
//! and fills in missing interfaces on the copies; the input is never mutated.

use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{MulticallError, Result};
use crate::infrastructure::abi::{AbiError, CallArg, ContractInterface};

const SHARED_INTERFACE_NEEDS_CALLS: &str =
    "second parameter must be a list of calls when the first parameter is an interface source";

/// Where a call's ABI comes from
#[derive(Debug, Clone)]
pub enum InterfaceSource {
    /// A pre-built interface, reused as-is
    Interface(ContractInterface),
    /// Raw ABI fragments (JSON objects or human-readable signatures),
    /// turned into an interface when the call is encoded
    Fragments(Vec<Value>),
}

impl InterfaceSource {
    /// Produce the interface used to encode and decode a call
    pub fn resolve(&self) -> Result<ContractInterface, AbiError> {
        match self {
            InterfaceSource::Interface(interface) => Ok(interface.clone()),
            InterfaceSource::Fragments(fragments) => ContractInterface::from_fragments(fragments),
        }
    }

    /// Interpret a JSON interface description: a fragment list, or an
    /// artifact object carrying an `abi` array
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(fragments) => Ok(InterfaceSource::Fragments(fragments.clone())),
            Value::Object(_) => ContractInterface::from_artifact(value)
                .map(InterfaceSource::Interface)
                .map_err(|e| MulticallError::InvalidArgument(e.to_string())),
            _ => Err(MulticallError::InvalidArgument(
                "interface must be an ABI fragment list or an artifact object".to_string(),
            )),
        }
    }
}

impl From<ContractInterface> for InterfaceSource {
    fn from(interface: ContractInterface) -> Self {
        InterfaceSource::Interface(interface)
    }
}

impl From<alloy_json_abi::JsonAbi> for InterfaceSource {
    fn from(abi: alloy_json_abi::JsonAbi) -> Self {
        InterfaceSource::Interface(ContractInterface::new(abi))
    }
}

impl From<Vec<Value>> for InterfaceSource {
    fn from(fragments: Vec<Value>) -> Self {
        InterfaceSource::Fragments(fragments)
    }
}

/// One contract read
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    pub target: Address,
    /// Required by encode time; may be supplied by the batch instead
    pub interface: Option<InterfaceSource>,
    /// Bare function name, or full signature to pick an overload
    pub function: String,
    pub args: Vec<CallArg>,
}

#[derive(Deserialize)]
struct RawCall {
    target: Address,
    function: String,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    interface: Option<Value>,
}

impl CallDescriptor {
    pub fn new(target: Address, function: impl Into<String>) -> Self {
        Self {
            target,
            interface: None,
            function: function.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<CallArg>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_interface(mut self, interface: impl Into<InterfaceSource>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Parse `{ "target", "function", "args"?, "interface"? }`
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw = RawCall::deserialize(value)
            .map_err(|e| MulticallError::InvalidArgument(format!("malformed call: {e}")))?;
        let interface = raw
            .interface
            .as_ref()
            .filter(|v| !v.is_null())
            .map(InterfaceSource::from_json)
            .transpose()?;

        Ok(Self {
            target: raw.target,
            interface,
            function: raw.function,
            args: raw.args.into_iter().map(CallArg::Json).collect(),
        })
    }
}

/// The canonical, normalized batch. Results align positionally with `calls`.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub calls: Vec<CallDescriptor>,
    pub strict: bool,
}

/// The two accepted batch shapes
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// One interface for every call that does not name its own
    SharedInterface {
        interface: InterfaceSource,
        calls: Vec<CallDescriptor>,
        strict: bool,
    },
    /// Every call carries its own interface
    PerCallInterface {
        calls: Vec<CallDescriptor>,
        strict: bool,
    },
}

impl BatchInput {
    /// Classify loosely typed positional arguments `(arg0, arg1, arg2)`.
    ///
    /// `arg0` is a shared interface when it is an artifact object, or a list
    /// whose first element is not a call (not an object, or an object with
    /// neither a `target` nor a `function` key). Only the first element is
    /// inspected, so a fragment list whose first entry happens to have one of
    /// those keys is read as a call list.
    pub fn from_positional(arg0: &Value, arg1: Option<&Value>, arg2: Option<bool>) -> Result<Self> {
        let calls = match arg0 {
            Value::Object(_) => {
                return Self::shared(InterfaceSource::from_json(arg0)?, arg1, arg2);
            }
            Value::Array(items) if items.first().is_some_and(is_abi_fragment) => {
                return Self::shared(InterfaceSource::Fragments(items.clone()), arg1, arg2);
            }
            Value::Array(calls) => parse_calls(calls)?,
            _ => {
                return Err(MulticallError::InvalidArgument(
                    "first parameter must be an interface source or a list of calls".to_string(),
                ))
            }
        };

        let strict = match arg1 {
            None | Some(Value::Null) => false,
            Some(Value::Bool(strict)) => *strict,
            Some(_) => {
                return Err(MulticallError::InvalidArgument(
                    "second parameter must be the strict flag when the first parameter is a list of calls"
                        .to_string(),
                ))
            }
        };
        Ok(BatchInput::PerCallInterface { calls, strict })
    }

    fn shared(interface: InterfaceSource, arg1: Option<&Value>, arg2: Option<bool>) -> Result<Self> {
        let Some(Value::Array(calls)) = arg1 else {
            return Err(MulticallError::InvalidArgument(
                SHARED_INTERFACE_NEEDS_CALLS.to_string(),
            ));
        };
        Ok(BatchInput::SharedInterface {
            interface,
            calls: parse_calls(calls)?,
            strict: arg2.unwrap_or(false),
        })
    }

    /// Produce the canonical request. Calls without an interface get the
    /// shared one; calls that specify their own keep it.
    ///
    /// Shared fragments are parsed here once and every call borrows the same
    /// interface. Fragments that fail to parse are passed through untouched
    /// so the encoder reports the failure against the first call using them.
    pub fn to_request(&self) -> BatchRequest {
        match self {
            BatchInput::SharedInterface {
                interface,
                calls,
                strict,
            } => {
                let shared = match interface {
                    InterfaceSource::Fragments(_) => interface
                        .resolve()
                        .map(InterfaceSource::Interface)
                        .unwrap_or_else(|_| interface.clone()),
                    InterfaceSource::Interface(_) => interface.clone(),
                };
                BatchRequest {
                    calls: calls
                        .iter()
                        .map(|call| CallDescriptor {
                            interface: call.interface.clone().or_else(|| Some(shared.clone())),
                            ..call.clone()
                        })
                        .collect(),
                    strict: *strict,
                }
            }
            BatchInput::PerCallInterface { calls, strict } => BatchRequest {
                calls: calls.clone(),
                strict: *strict,
            },
        }
    }
}

fn is_abi_fragment(first: &Value) -> bool {
    match first {
        Value::Object(keys) => !keys.contains_key("target") && !keys.contains_key("function"),
        _ => true,
    }
}

fn parse_calls(values: &[Value]) -> Result<Vec<CallDescriptor>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            CallDescriptor::from_json(value).map_err(|e| match e {
                MulticallError::InvalidArgument(reason) => {
                    MulticallError::InvalidArgument(format!("call #{index}: {reason}"))
                }
                other => other,
            })
        })
        .collect()
}
