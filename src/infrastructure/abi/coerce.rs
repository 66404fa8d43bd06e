//! JSON argument coercion into typed ABI values

use alloy_dyn_abi::{DynSolType, DynSolValue};
use serde_json::Value;

/// Coerce a JSON value into a value of type `ty`.
///
/// Scalars go through the alloy-dyn-abi string parser (so `"1.5 ether"`,
/// checksummed and lowercase addresses, and decimal or hex integers all
/// work). Arrays and tuples are coerced element-wise from JSON arrays.
pub fn coerce_json(ty: &DynSolType, value: &Value) -> Result<DynSolValue, String> {
    match (ty, value) {
        (DynSolType::String, Value::String(s)) => Ok(DynSolValue::String(s.clone())),

        (DynSolType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| coerce_json(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),

        (DynSolType::FixedArray(inner, size), Value::Array(items)) => {
            if items.len() != *size {
                return Err(format!(
                    "fixed array size mismatch: expected {} elements, got {}",
                    size,
                    items.len()
                ));
            }
            items
                .iter()
                .map(|item| coerce_json(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }

        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(format!(
                    "tuple size mismatch: expected {} elements, got {}",
                    types.len(),
                    items.len()
                ));
            }
            types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce_json(ty, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }

        (_, Value::String(s)) => coerce_str(ty, s),
        (_, Value::Number(n)) => coerce_str(ty, &n.to_string()),
        (_, Value::Bool(b)) => coerce_str(ty, if *b { "true" } else { "false" }),

        (_, other) => Err(format!("cannot coerce {} into {}", json_kind(other), ty)),
    }
}

fn coerce_str(ty: &DynSolType, s: &str) -> Result<DynSolValue, String> {
    ty.coerce_str(s.trim()).map_err(|e| e.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
