//! Batch domain models
//!
//! Defines what a batch is (calls, interface sources, failure policy) and
//! what comes back, independent of how calls are encoded or executed.

mod batch;
mod result;

pub use batch::{BatchInput, BatchRequest, CallDescriptor, InterfaceSource};
pub use result::{
    AggregatedResponse, BatchOutput, DecodedResult, TokenBalanceAndAllowance, TokenBalances,
    TokenBalancesAndAllowances,
};
