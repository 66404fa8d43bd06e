//! Contract interface built on alloy-json-abi, encoding and decoding via alloy-dyn-abi

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;
use serde_json::Value;

use super::coerce::coerce_json;

/// Errors raised while building an interface or encoding/decoding against it
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("function `{0}` not found in interface")]
    UnknownFunction(String),

    #[error("function `{0}` is overloaded; call it by full signature, e.g. `{1}`")]
    AmbiguousFunction(String, String),

    #[error("argument count mismatch: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("argument {index} ({kind}): {reason}")]
    Argument {
        index: usize,
        kind: String,
        reason: String,
    },

    #[error(transparent)]
    DynAbi(#[from] alloy_dyn_abi::Error),
}

/// One call argument: either already typed, or JSON coerced against the
/// declared input type when the call is encoded
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Value(DynSolValue),
    Json(Value),
}

impl From<DynSolValue> for CallArg {
    fn from(value: DynSolValue) -> Self {
        Self::Value(value)
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<alloy_primitives::Address> for CallArg {
    fn from(value: alloy_primitives::Address) -> Self {
        Self::Value(DynSolValue::Address(value))
    }
}

impl From<alloy_primitives::U256> for CallArg {
    fn from(value: alloy_primitives::U256) -> Self {
        Self::Value(DynSolValue::Uint(value, 256))
    }
}

impl From<bool> for CallArg {
    fn from(value: bool) -> Self {
        Self::Value(DynSolValue::Bool(value))
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

/// An immutable, cheaply clonable contract interface.
///
/// Clones share the parsed ABI, so a single interface can back any number of
/// calls and concurrent batches.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    abi: Arc<JsonAbi>,
}

impl ContractInterface {
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi: Arc::new(abi) }
    }

    /// Build an interface from a raw fragment list.
    ///
    /// Fragments are either JSON ABI objects or human-readable signatures
    /// such as `function balanceOf(address) view returns (uint256)`; the
    /// first element decides which form the whole list uses.
    pub fn from_fragments(fragments: &[Value]) -> Result<Self, AbiError> {
        if fragments.first().is_some_and(Value::is_string) {
            let signatures = fragments
                .iter()
                .map(|fragment| {
                    fragment.as_str().ok_or_else(|| {
                        AbiError::InvalidAbi(
                            "mixed human-readable and JSON fragments".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let abi = JsonAbi::parse(signatures)
                .map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
            return Ok(Self::new(abi));
        }

        let abi: JsonAbi = serde_json::from_value(Value::Array(fragments.to_vec()))
            .map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
        Ok(Self::new(abi))
    }

    /// Build an interface from a compiler artifact (`{ "abi": [...] }`)
    pub fn from_artifact(artifact: &Value) -> Result<Self, AbiError> {
        match artifact.get("abi") {
            Some(Value::Array(fragments)) => Self::from_fragments(fragments),
            Some(_) => Err(AbiError::InvalidAbi("`abi` must be an array".to_string())),
            None => Err(AbiError::InvalidAbi("artifact has no `abi` field".to_string())),
        }
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Resolve a function by bare name or full signature.
    ///
    /// A bare name that is overloaded is disambiguated by `arity` when exactly
    /// one overload takes that many inputs.
    pub fn function(&self, selector: &str, arity: Option<usize>) -> Result<&Function, AbiError> {
        let selector = selector.trim();

        if selector.contains('(') {
            let wanted: String = selector.chars().filter(|c| !c.is_whitespace()).collect();
            return self
                .abi
                .functions()
                .find(|function| function.signature() == wanted)
                .ok_or_else(|| AbiError::UnknownFunction(selector.to_string()));
        }

        let overloads = self
            .abi
            .function(selector)
            .ok_or_else(|| AbiError::UnknownFunction(selector.to_string()))?;

        match overloads.as_slice() {
            [only] => Ok(only),
            many => {
                let mut matching = many
                    .iter()
                    .filter(|function| arity.map_or(true, |n| function.inputs.len() == n));
                match (matching.next(), matching.next(), arity) {
                    (Some(function), None, Some(_)) => Ok(function),
                    _ => Err(AbiError::AmbiguousFunction(
                        selector.to_string(),
                        many[0].signature(),
                    )),
                }
            }
        }
    }

    /// Encode call data (selector followed by arguments) for `function`
    pub fn encode_function_data(
        &self,
        function: &str,
        args: &[CallArg],
    ) -> Result<(Function, Bytes), AbiError> {
        let function = self.function(function, Some(args.len()))?;
        let data = encode_call(function, args)?;
        Ok((function.clone(), data))
    }

    /// Decode the return data of `function`
    pub fn decode_function_result(
        &self,
        function: &str,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, AbiError> {
        let function = self.function(function, None)?;
        Ok(function.abi_decode_output(data)?)
    }
}

/// Encode call data for an already resolved function
pub fn encode_call(function: &Function, args: &[CallArg]) -> Result<Bytes, AbiError> {
    if args.len() != function.inputs.len() {
        return Err(AbiError::ArgumentCount {
            expected: function.inputs.len(),
            got: args.len(),
        });
    }

    let values = function
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            let ty: DynSolType = param.resolve()?;
            match arg {
                CallArg::Value(value) => Ok(value.clone()),
                CallArg::Json(json) => coerce_json(&ty, json).map_err(|reason| AbiError::Argument {
                    index,
                    kind: param.selector_type().into_owned(),
                    reason,
                }),
            }
        })
        .collect::<Result<Vec<_>, AbiError>>()?;

    Ok(function.abi_encode_input(&values)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use serde_json::json;

    fn erc20_fragments() -> Vec<Value> {
        vec![
            json!({
                "type": "function",
                "name": "balanceOf",
                "stateMutability": "view",
                "inputs": [{ "name": "owner", "type": "address" }],
                "outputs": [{ "name": "", "type": "uint256" }]
            }),
            json!({
                "type": "function",
                "name": "getReserves",
                "stateMutability": "view",
                "inputs": [],
                "outputs": [
                    { "name": "reserve0", "type": "uint112" },
                    { "name": "reserve1", "type": "uint112" },
                    { "name": "blockTimestampLast", "type": "uint32" }
                ]
            }),
        ]
    }

    #[test]
    fn test_encode_balance_of() {
        let iface = ContractInterface::from_fragments(&erc20_fragments()).unwrap();
        let owner = address!("1234567890123456789012345678901234567890");

        let (function, data) = iface
            .encode_function_data("balanceOf", &[owner.into()])
            .unwrap();

        assert_eq!(function.name, "balanceOf");
        assert_eq!(
            hex::encode(&data),
            "70a082310000000000000000000000001234567890123456789012345678901234567890"
        );
    }

    #[test]
    fn test_json_argument_coerced() {
        let iface = ContractInterface::from_fragments(&erc20_fragments()).unwrap();
        let typed = iface
            .encode_function_data(
                "balanceOf",
                &[address!("1234567890123456789012345678901234567890").into()],
            )
            .unwrap()
            .1;
        let from_json = iface
            .encode_function_data(
                "balanceOf",
                &["0x1234567890123456789012345678901234567890".into()],
            )
            .unwrap()
            .1;
        assert_eq!(typed, from_json);
    }

    #[test]
    fn test_human_readable_fragments() {
        let iface = ContractInterface::from_fragments(&[json!(
            "function balanceOf(address owner) view returns (uint256)"
        )])
        .unwrap();
        assert!(iface.function("balanceOf", None).is_ok());
    }

    #[test]
    fn test_decode_multiple_outputs() {
        let iface = ContractInterface::from_fragments(&erc20_fragments()).unwrap();
        let data = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(10), 112),
            DynSolValue::Uint(U256::from(20), 112),
            DynSolValue::Uint(U256::from(30), 32),
        ])
        .abi_encode_params();

        let values = iface.decode_function_result("getReserves", &data).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], DynSolValue::Uint(U256::from(20), 112));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let iface = ContractInterface::from_fragments(&erc20_fragments()).unwrap();
        let result = iface.encode_function_data("balanceOf", &[]);
        assert!(matches!(
            result,
            Err(AbiError::ArgumentCount { expected: 1, got: 0 })
        ));
    }

    #[test]
    fn test_overload_resolution() {
        let iface = ContractInterface::from_fragments(&[
            json!("function quote(uint256 amount) view returns (uint256)"),
            json!("function quote(uint256 amount, address token) view returns (uint256)"),
        ])
        .unwrap();

        assert_eq!(iface.function("quote", Some(2)).unwrap().inputs.len(), 2);
        assert_eq!(
            iface.function("quote(uint256)", None).unwrap().inputs.len(),
            1
        );
        assert!(matches!(
            iface.function("quote", None),
            Err(AbiError::AmbiguousFunction(..))
        ));
    }

    #[test]
    fn test_unknown_function() {
        let iface = ContractInterface::from_fragments(&erc20_fragments()).unwrap();
        assert!(matches!(
            iface.function("transfer", None),
            Err(AbiError::UnknownFunction(name)) if name == "transfer"
        ));
    }

    #[test]
    fn test_artifact_without_abi() {
        let result = ContractInterface::from_artifact(&json!({ "bytecode": "0x" }));
        assert!(matches!(result, Err(AbiError::InvalidAbi(_))));
    }
}
