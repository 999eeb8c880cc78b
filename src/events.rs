//! Deposit event binding and log decoding.
//!
//! The bridge contract emits
//!
//! ```text
//! event Deposit(address indexed token, address indexed recipient, uint256 amount);
//! ```
//!
//! The binding is generated with Alloy's `sol!` macro, so the signature hash
//! and the topic/data layout are checked at compile time. Decoded entries are
//! exposed as [`DepositLog`], a plain struct with named fields, which is what
//! the [`EventSource`](crate::scanner::EventSource) capability hands to the
//! scanner.
//!
//! ## Example
//!
//! ```no_run
//! use deposit_scanner::events::{create_deposit_filter, decode_deposit_log};
//! use alloy::primitives::address;
//! use alloy::providers::{Provider, ProviderBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new().on_http("http://localhost:8545".parse()?);
//! let bridge = address!("0000000000000000000000000000000000000001");
//! let filter = create_deposit_filter(bridge, 100, 110);
//! for log in provider.get_logs(&filter).await? {
//!     let deposit = decode_deposit_log(&log)?;
//!     println!("{} -> {}: {}", deposit.token, deposit.recipient, deposit.amount);
//! }
//! # Ok(())
//! # }
//! ```

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use alloy::sol_types::SolEvent;

use crate::error::{ScannerError, ScannerResult};

sol! {
    interface IBridge {
        /// Emitted when tokens are locked on the source chain for a recipient.
        event Deposit(address indexed token, address indexed recipient, uint256 amount);
    }
}

pub use IBridge::Deposit;

/// A decoded Deposit log entry as returned by the query capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositLog {
    /// Token that was deposited.
    pub token: Address,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Deposited amount in the token's base units.
    pub amount: U256,
    /// Hash of the transaction that emitted the event.
    pub transaction_hash: B256,
    /// Contract that emitted the event.
    pub address: Address,
}

/// Create a filter for Deposit events emitted by `contract` in
/// `[from_block, to_block]` (both inclusive).
#[must_use]
pub fn create_deposit_filter(contract: Address, from_block: u64, to_block: u64) -> Filter {
    Filter::new()
        .address(contract)
        .event_signature(Deposit::SIGNATURE_HASH)
        .from_block(from_block)
        .to_block(to_block)
}

/// Decode an RPC log into a [`DepositLog`].
///
/// # Errors
///
/// Returns a decoding error if the topics or data do not match the Deposit
/// signature, or if the node omitted the transaction hash (only pending logs
/// lack one, and a block-range query never returns those).
pub fn decode_deposit_log(log: &Log) -> ScannerResult<DepositLog> {
    let decoded = Deposit::decode_log(&log.inner, true).map_err(|e| {
        ScannerError::decoding(
            format!("failed to decode Deposit event from {}", log.address()),
            Some(Box::new(e)),
        )
    })?;

    let transaction_hash = log
        .transaction_hash
        .ok_or_else(|| ScannerError::decoding("Deposit log is missing its transaction hash", None))?;

    Ok(DepositLog {
        token: decoded.data.token,
        recipient: decoded.data.recipient,
        amount: decoded.data.amount,
        transaction_hash,
        address: decoded.address,
    })
}
