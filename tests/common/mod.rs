//! Scripted collaborators for scanner tests.
//!
//! [`ScriptedSource`] serves head heights from a script and Deposit logs from
//! a per-block table, recording every query. [`RecordingSink`] keeps appended
//! batches in memory and can be told to fail.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use alloy::primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use deposit_scanner::{
    error::{ScannerError, ScannerResult},
    events::DepositLog,
    models::DepositEvent,
    scanner::EventSource,
    sink::DepositSink,
};

pub const BRIDGE: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const TOKEN: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
pub const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

/// A Deposit log with a transaction hash unique to `(block, index)`.
pub fn deposit(block: u64, index: u64, amount: U256) -> DepositLog {
    let id = block * 100_000 + index;
    DepositLog {
        token: TOKEN,
        recipient: RECIPIENT,
        amount,
        transaction_hash: B256::left_padding_from(&id.to_be_bytes()),
        address: BRIDGE,
    }
}

/// Query capability driven by a script.
pub struct ScriptedSource {
    /// Head heights served in order; the last one repeats.
    heads: Mutex<VecDeque<u64>>,
    deposits: BTreeMap<u64, Vec<DepositLog>>,
    fail_at_block: Option<u64>,
    head_queries: Mutex<usize>,
    event_queries: Mutex<Vec<(u64, u64)>>,
}

impl ScriptedSource {
    pub fn with_head(head: u64) -> Self {
        Self::with_heads(&[head])
    }

    pub fn with_heads(heads: &[u64]) -> Self {
        Self {
            heads: Mutex::new(heads.iter().copied().collect()),
            deposits: BTreeMap::new(),
            fail_at_block: None,
            head_queries: Mutex::new(0),
            event_queries: Mutex::new(Vec::new()),
        }
    }

    /// Put `count` deposits of `amount` in `block`.
    pub fn deposits_in(mut self, block: u64, count: u64, amount: U256) -> Self {
        let logs = self.deposits.entry(block).or_default();
        let offset = logs.len() as u64;
        logs.extend((0..count).map(|i| deposit(block, offset + i, amount)));
        self
    }

    /// Fail any query whose range covers `block`.
    pub fn failing_at(mut self, block: u64) -> Self {
        self.fail_at_block = Some(block);
        self
    }

    pub fn event_queries(&self) -> Vec<(u64, u64)> {
        self.event_queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn head_queries(&self) -> usize {
        self.head_queries.lock().map(|n| *n).unwrap_or_default()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn current_head(&self) -> ScannerResult<u64> {
        if let Ok(mut n) = self.head_queries.lock() {
            *n += 1;
        }
        let mut heads = self
            .heads
            .lock()
            .map_err(|_| ScannerError::rpc("head script poisoned", None))?;
        let head = if heads.len() > 1 {
            heads.pop_front()
        } else {
            heads.front().copied()
        };
        head.ok_or_else(|| ScannerError::rpc("no head scripted", None))
    }

    async fn query_deposits(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> ScannerResult<Vec<DepositLog>> {
        if let Ok(mut q) = self.event_queries.lock() {
            q.push((from_block, to_block));
        }
        if let Some(block) = self.fail_at_block {
            if (from_block..=to_block).contains(&block) {
                return Err(ScannerError::rpc(format!("eth_getLogs failed at block {block}"), None));
            }
        }
        Ok(self
            .deposits
            .range(from_block..=to_block)
            .flat_map(|(_, logs)| logs.iter())
            .filter(|log| log.address == contract)
            .cloned()
            .collect())
    }
}

/// In-memory sink that records every append.
#[derive(Default)]
pub struct RecordingSink {
    exists: bool,
    /// `(rows, write_header)` per append, in order.
    pub appends: Vec<(usize, bool)>,
    pub rows: Vec<DepositEvent>,
    fail_on_append: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose store already exists.
    pub fn existing() -> Self {
        Self {
            exists: true,
            ..Self::default()
        }
    }

    /// Fail the append with this zero-based index.
    pub fn failing_on_append(index: usize) -> Self {
        Self {
            fail_on_append: Some(index),
            ..Self::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.appends.iter().map(|(n, _)| *n).collect()
    }

    pub fn headers_written(&self) -> usize {
        self.appends.iter().filter(|(_, header)| *header).count()
    }
}

#[async_trait]
impl DepositSink for RecordingSink {
    async fn exists(&self) -> ScannerResult<bool> {
        Ok(self.exists)
    }

    async fn append_rows(&mut self, rows: &[DepositEvent], write_header: bool) -> ScannerResult<()> {
        if self.fail_on_append == Some(self.appends.len()) {
            return Err(ScannerError::sink("disk full", None));
        }
        self.appends.push((rows.len(), write_header));
        self.rows.extend_from_slice(rows);
        self.exists = true;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
