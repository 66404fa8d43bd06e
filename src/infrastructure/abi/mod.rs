//! ABI coordination - interfaces, argument coercion and value rendering
//! on top of alloy-json-abi and alloy-dyn-abi

mod coerce;
mod interface;
mod render;

pub use coerce::coerce_json;
pub use interface::{encode_call, AbiError, CallArg, ContractInterface};
pub use render::value_to_json;
