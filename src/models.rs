//! Request, row and result types passed between the scanner and its callers.

use alloy::primitives::{hex, Address, U256};
use serde::Serialize;

use crate::chain::{BlockBound, Chain};
use crate::error::ScannerError;
use crate::events::DepositLog;

/// Output columns, in write order.
pub const COLUMNS: [&str; 6] = [
    "chain",
    "token",
    "recipient",
    "amount",
    "transactionHash",
    "address",
];

/// One scan invocation: which chain, which blocks, which contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    /// Chain to read from.
    pub chain: Chain,
    /// First block to scan (inclusive).
    pub start: BlockBound,
    /// Last block to scan (inclusive), clamped to the chain head.
    pub end: BlockBound,
    /// Contract whose Deposit events are recorded.
    pub contract: Address,
}

impl ScanRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        chain: Chain,
        start: impl Into<BlockBound>,
        end: impl Into<BlockBound>,
        contract: Address,
    ) -> Self {
        Self {
            chain,
            start: start.into(),
            end: end.into(),
            contract,
        }
    }
}

/// A normalized Deposit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    chain: Chain,
    token: Address,
    recipient: Address,
    amount: U256,
    transaction_hash: String,
    address: Address,
}

impl DepositEvent {
    /// Normalize a decoded log entry observed on `chain`.
    #[must_use]
    pub fn from_log(chain: Chain, log: &DepositLog) -> Self {
        Self {
            chain,
            token: log.token,
            recipient: log.recipient,
            amount: log.amount,
            transaction_hash: hex::encode(log.transaction_hash),
            address: log.address,
        }
    }

    /// Chain the event was observed on.
    #[must_use]
    pub const fn chain(&self) -> Chain {
        self.chain
    }

    /// Deposited token.
    #[must_use]
    pub const fn token(&self) -> Address {
        self.token
    }

    /// Recipient of the deposit.
    #[must_use]
    pub const fn recipient(&self) -> Address {
        self.recipient
    }

    /// Deposited amount in base units.
    #[must_use]
    pub const fn amount(&self) -> U256 {
        self.amount
    }

    /// Transaction hash as 64 lowercase hex digits.
    #[must_use]
    pub fn transaction_hash(&self) -> &str {
        &self.transaction_hash
    }

    /// Emitting contract.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Row cells in [`COLUMNS`] order.
    ///
    /// Addresses are EIP-55 checksummed and the amount is written in base 10.
    #[must_use]
    pub fn to_record(&self) -> [String; 6] {
        [
            self.chain.to_string(),
            self.token.to_checksum(None),
            self.recipient.to_checksum(None),
            self.amount.to_string(),
            self.transaction_hash.clone(),
            self.address.to_checksum(None),
        ]
    }
}

/// How a range is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// One query covering the whole range, one flush.
    SingleQuery,
    /// One query per block, flushing whenever the batch fills.
    PerBlock,
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The whole resolved range was scanned.
    Completed {
        /// Resolved start block.
        start: u64,
        /// Resolved and clamped end block.
        end: u64,
        /// Strategy used.
        strategy: ScanStrategy,
    },
    /// The resolved end preceded the start; nothing was queried.
    Aborted {
        /// Resolved start block.
        start: u64,
        /// Resolved and clamped end block.
        end: u64,
    },
}

/// Summary of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Chain that was scanned.
    pub chain: Chain,
    /// Deposit events observed across the range.
    pub total_found: usize,
    /// Rows appended to the sink across all flushes.
    pub rows_written: usize,
    /// Non-empty flushes performed.
    pub flushes: usize,
    /// Event-log queries issued (head queries excluded).
    pub event_queries: u64,
    /// How the scan ended.
    #[serde(flatten)]
    pub outcome: ScanOutcome,
}

impl ScanResult {
    pub(crate) const fn aborted(chain: Chain, start: u64, end: u64) -> Self {
        Self {
            chain,
            total_found: 0,
            rows_written: 0,
            flushes: 0,
            event_queries: 0,
            outcome: ScanOutcome::Aborted { start, end },
        }
    }

    /// Whether the scan was aborted because of an inverted range.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Aborted { .. })
    }

    /// The range error behind an aborted scan.
    #[must_use]
    pub fn range_error(&self) -> Option<ScannerError> {
        match self.outcome {
            ScanOutcome::Aborted { start, end } => Some(ScannerError::range(start, end)),
            ScanOutcome::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    fn sample_log(amount: U256) -> DepositLog {
        DepositLog {
            token: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            recipient: address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
            amount,
            transaction_hash: b256!(
                "ABCDEF0000000000000000000000000000000000000000000000000000000001"
            ),
            address: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
        }
    }

    #[test]
    fn test_normalization_renders_hash_lowercase() {
        let event = DepositEvent::from_log(Chain::Bsc, &sample_log(U256::from(5_u64)));
        assert_eq!(
            event.transaction_hash(),
            "abcdef0000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(event.chain(), Chain::Bsc);
    }

    #[test]
    fn test_record_column_order() {
        let event = DepositEvent::from_log(Chain::Avax, &sample_log(U256::from(5_u64)));
        let record = event.to_record();

        assert_eq!(record[0], "avax");
        assert_eq!(record[1], "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert_eq!(record[2], "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert_eq!(record[3], "5");
        assert_eq!(record[5], "0x5FbDB2315678afecb367f032d93F642f64180aa3");
    }

    #[test]
    fn test_amount_beyond_u64_keeps_precision() {
        // 2^63 and 2^200 + 7
        let big = U256::from(1_u64) << 63_usize;
        let huge = (U256::from(1_u64) << 200_usize) + U256::from(7_u64);

        let record = DepositEvent::from_log(Chain::Bsc, &sample_log(big)).to_record();
        assert_eq!(record[3], "9223372036854775808");

        let record = DepositEvent::from_log(Chain::Bsc, &sample_log(huge)).to_record();
        assert_eq!(
            record[3],
            "1606938044258990275541962092341162602522202993782792835301383"
        );
    }

    #[test]
    fn test_aborted_result_reports_range_error() {
        let result = ScanResult::aborted(Chain::Bsc, 200, 100);
        assert!(result.is_aborted());
        assert_eq!(result.total_found, 0);
        assert!(matches!(
            result.range_error(),
            Some(ScannerError::RangeError { start: 200, end: 100 })
        ));
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = ScanResult {
            chain: Chain::Avax,
            total_found: 3,
            rows_written: 3,
            flushes: 1,
            event_queries: 1,
            outcome: ScanOutcome::Completed {
                start: 100,
                end: 110,
                strategy: ScanStrategy::SingleQuery,
            },
        };
        let json = serde_json::to_value(result);
        assert!(json.is_ok());
        if let Ok(json) = json {
            assert_eq!(json["chain"], "avax");
            assert_eq!(json["status"], "completed");
            assert_eq!(json["strategy"], "single_query");
            assert_eq!(json["end"], 110);
        }
    }
}
