//! RPC access to the supported chains.
//!
//! - [`http`]: provider construction and raw JSON-RPC calls
//! - [`source`]: [`RpcEventSource`], the scanner's query capability over RPC
//!
//! One provider is built per chain. Whether a chain needs the
//! proof-of-authority network type is decided from its
//! [`EndpointConfig`](crate::config::EndpointConfig) at construction and never
//! revisited while scanning.

pub mod http;
pub mod source;

pub use http::{check_connection, create_provider, get_latest_block, ChainProvider};
pub use source::RpcEventSource;
