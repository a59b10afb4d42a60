use std::net::IpAddr;
use std::time::Duration;

use probr_common::config::ScanLimits;
use probr_common::network::target::{self, Target};
use probr_common::signal::AbortSignal;
use probr_core::error::ScanError;
use probr_core::scanner::{self, ScanOutcome, ScanRequest, ScanSummary, Scanner};

use crate::utils::{closed_port, listener, LOCALHOST};

fn limits() -> ScanLimits {
    ScanLimits::default().with_timeout(Duration::from_millis(500))
}

fn completed(outcome: ScanOutcome) -> ScanSummary {
    match outcome {
        ScanOutcome::Completed(summary) => summary,
        other => panic!("expected a completed scan, got {other:?}"),
    }
}

#[tokio::test]
async fn finds_exactly_the_listening_loopback_ports() {
    let (_a, port_a) = listener().await;
    let (_b, port_b) = listener().await;
    let closed = closed_port().await;

    let spec = format!("{port_a},{closed},{port_b}");
    let request = ScanRequest::new(vec![Target::from(LOCALHOST)], spec).with_limits(&limits());

    let summary = completed(
        scanner::run_scan(request, &limits(), &AbortSignal::new())
            .await
            .unwrap(),
    );

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];

    let mut expected = vec![port_a, port_b];
    expected.sort_unstable();
    assert_eq!(report.open_ports.iter().copied().collect::<Vec<_>>(), expected);
    assert_eq!(report.probe_count, 3);
    assert_eq!(report.error, None);
    assert!(!summary.aborted);
}

#[tokio::test]
async fn unresolvable_host_degrades_to_an_error_note() {
    let (_open, port) = listener().await;
    let targets = target::parse_targets("no-such-host.invalid, 127.0.0.1");
    let request = ScanRequest::new(targets, port.to_string()).with_limits(&limits());

    let summary = completed(
        scanner::run_scan(request, &limits(), &AbortSignal::new())
            .await
            .unwrap(),
    );

    assert_eq!(summary.reports.len(), 2);

    let unresolved = &summary.reports[0];
    assert_eq!(unresolved.target.name(), "no-such-host.invalid");
    assert!(unresolved.open_ports.is_empty());
    assert!(unresolved.error.is_some());

    let loopback = &summary.reports[1];
    assert!(loopback.open_ports.contains(&port));
    assert_eq!(loopback.error, None);
}

#[tokio::test]
async fn localhost_is_resolved_once_and_reported() {
    let request = ScanRequest::new(vec![Target::new("localhost")], closed_port().await.to_string())
        .with_limits(&limits());

    let summary = completed(
        scanner::run_scan(request, &limits(), &AbortSignal::new())
            .await
            .unwrap(),
    );

    let report = &summary.reports[0];
    assert_eq!(report.target.name(), "localhost");
    assert!(report.target.addr().is_some_and(|addr: IpAddr| addr.is_loopback()));
    assert_eq!(report.probe_count, 1);
}

#[tokio::test]
async fn large_scan_is_held_back_without_confirmation() {
    let mut scanner = Scanner::new(&limits());
    let request = ScanRequest::new(vec![Target::from(LOCALHOST)], "1-2000");

    let outcome = scanner.run_scan(request, &AbortSignal::new()).await.unwrap();

    assert_eq!(
        outcome,
        ScanOutcome::ConfirmationRequired {
            port_count: 2000,
            threshold: 1000
        }
    );
}

#[tokio::test]
async fn threshold_follows_the_limits() {
    let limits = ScanLimits {
        large_scan_threshold: 2,
        ..limits()
    };
    let mut scanner = Scanner::new(&limits);
    let request = ScanRequest::new(vec![Target::from(LOCALHOST)], "1-3");

    let outcome = scanner.run_scan(request, &AbortSignal::new()).await.unwrap();
    assert!(matches!(
        outcome,
        ScanOutcome::ConfirmationRequired { port_count: 3, threshold: 2 }
    ));
}

#[tokio::test]
async fn aborted_run_still_reports_every_target() {
    let abort = AbortSignal::new();
    abort.trigger();

    let targets = target::parse_targets("127.0.0.1 127.0.0.2 127.0.0.3");
    let request = ScanRequest::new(targets, "80").with_limits(&limits());

    let summary = completed(scanner::run_scan(request, &limits(), &abort).await.unwrap());

    assert!(summary.aborted);
    assert_eq!(summary.reports.len(), 3);
    assert!(summary
        .reports
        .iter()
        .all(|r| r.error.as_deref() == Some("scan aborted") && r.probe_count == 0));
}

#[tokio::test]
async fn listening_port_survives_a_wide_fast_scan() {
    let (_open, port) = listener().await;
    let limits = limits().with_concurrency(500);

    let spec = format!("1-900,{port}");
    let request = ScanRequest::new(vec![Target::from(LOCALHOST)], spec).with_limits(&limits);

    let summary = completed(
        scanner::run_scan(request, &limits, &AbortSignal::new())
            .await
            .unwrap(),
    );

    let report = &summary.reports[0];
    assert_eq!(report.probe_count, 901);
    assert!(
        report.open_ports.contains(&port) || report.error.is_some(),
        "port {port} was reported closed without a note"
    );
}

#[tokio::test]
async fn concurrency_above_the_ceiling_is_refused() {
    let (_open, port) = listener().await;
    let limits = limits().with_concurrency(501);
    let request = ScanRequest::new(vec![Target::from(LOCALHOST)], port.to_string())
        .with_limits(&limits);

    let mut scanner = Scanner::new(&limits);
    let result = scanner.run_scan(request, &AbortSignal::new()).await;

    assert!(matches!(result, Err(ScanError::InvalidRequest(_))));
}
