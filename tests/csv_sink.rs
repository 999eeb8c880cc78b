//! End-to-end scans into a CSV file on disk.

#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use alloy::primitives::U256;
use common::{RecordingSink, ScriptedSource, BRIDGE};
use deposit_scanner::{
    chain::Chain,
    models::{DepositEvent, ScanRequest, COLUMNS},
    scanner::{EventSource, RangeScanner},
    sink::{CsvSink, DepositSink},
};

const HEADER: &str = "chain,token,recipient,amount,transactionHash,address";

fn scanner_with(source: ScriptedSource) -> RangeScanner {
    let source: Arc<dyn EventSource> = Arc::new(source);
    RangeScanner::new().with_source(Chain::Avax, source)
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_two_scans_append_under_one_header() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let path = dir.path().join("deposit_logs.csv");
    let scanner = scanner_with(
        ScriptedSource::with_head(10_000)
            .deposits_in(100, 2, U256::from(5_u64))
            .deposits_in(500, 1, U256::from(6_u64)),
    );

    let mut sink = CsvSink::new(&path);
    let first = scanner
        .scan(&ScanRequest::new(Chain::Avax, 90, 110, BRIDGE), &mut sink)
        .await;
    assert!(matches!(first, Ok(ref r) if r.rows_written == 2));

    // A fresh sink on the same path must see the file and skip the header.
    let mut sink = CsvSink::new(&path);
    let second = scanner
        .scan(&ScanRequest::new(Chain::Avax, 490, 510, BRIDGE), &mut sink)
        .await;
    assert!(matches!(second, Ok(ref r) if r.rows_written == 1));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.iter().filter(|line| line.as_str() == HEADER).count(), 1);
    assert!(lines[1..].iter().all(|line| line.starts_with("avax,0x")));
    assert!(lines[3].contains(",6,"));
}

#[tokio::test]
async fn test_empty_scan_does_not_create_file() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let path = dir.path().join("deposit_logs.csv");
    let scanner = scanner_with(ScriptedSource::with_head(10_000));

    let mut sink = CsvSink::new(&path);
    let result = scanner
        .scan(&ScanRequest::new(Chain::Avax, 1, 5, BRIDGE), &mut sink)
        .await;

    assert!(result.is_ok());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_rows_parse_back_with_exact_amounts() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let path = dir.path().join("deposit_logs.csv");
    let amount = (U256::from(1_u64) << 63_usize) + U256::from(1_u64);
    let scanner = scanner_with(ScriptedSource::with_head(10_000).deposits_in(42, 1, amount));

    let mut sink = CsvSink::new(&path);
    assert!(scanner
        .scan(&ScanRequest::new(Chain::Avax, 40, 45, BRIDGE), &mut sink)
        .await
        .is_ok());

    let Ok(mut reader) = csv::Reader::from_path(&path) else {
        panic!("failed to open {}", path.display());
    };
    let headers = reader.headers().map(|h| h.iter().map(str::to_string).collect::<Vec<_>>());
    assert!(matches!(headers, Ok(ref h) if h == &COLUMNS));

    let records: Vec<csv::StringRecord> = reader.records().filter_map(Result::ok).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "avax");
    assert_eq!(&records[0][3], "9223372036854775809");
    assert_eq!(records[0][4].len(), 64);
    assert_eq!(&records[0][5], BRIDGE.to_checksum(None));
}

/// Header decisions made by the scanner's rule over three appends.
async fn header_decisions<S: DepositSink>(sink: &mut S) -> Vec<bool> {
    let row = DepositEvent::from_log(Chain::Avax, &common::deposit(7, 0, U256::from(1_u64)));
    let mut decisions = Vec::new();
    for _ in 0..3 {
        let write_header = !matches!(sink.exists().await, Ok(true));
        assert!(sink.append_rows(std::slice::from_ref(&row), write_header).await.is_ok());
        decisions.push(write_header);
    }
    decisions
}

#[tokio::test]
async fn test_recording_sink_follows_csv_sink_header_rule() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let path = dir.path().join("deposit_logs.csv");

    let on_disk = header_decisions(&mut CsvSink::new(&path)).await;
    let in_memory = header_decisions(&mut RecordingSink::new()).await;

    assert_eq!(on_disk, vec![true, false, false]);
    assert_eq!(on_disk, in_memory);
    assert_eq!(read_lines(&path).iter().filter(|line| line.as_str() == HEADER).count(), 1);
}
