//! RPC Access - Chain reads over JSON-RPC
//! Every network read in the canister goes through this zone

pub mod abi;
pub mod json_rpc;
pub mod outcalls;
pub mod resilient;

pub use outcalls::{live_reader, LiveReader};
pub use resilient::resilient_call;
