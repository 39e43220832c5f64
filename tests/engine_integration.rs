// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Detection Engine Integration Tests
 * End-to-end flows over a stub transport: passive grep across simulated
 * responses, active probing with injected failures, and per-scan
 * lifecycle guarantees
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::sync::atomic::{AtomicUsize, Ordering};

use ansa_engine::detectors::response_splitting::{HEADER_NAME, HEADER_VALUE};
use ansa_engine::detectors::{
    DetectorRegistry, DirectoryIndexingDetector, ResponseSplittingDetector, StrangeHeadersDetector,
};
use ansa_engine::{
    EngineConfig, HttpRequest, HttpResponse, ProbeOutcome, ScanSession, Severity, TransportError,
};
use url::Url;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn request(url: &str) -> HttpRequest {
    HttpRequest::get(Url::parse(url).unwrap())
}

fn html_response(url: &str, body: &str, extra_headers: Vec<(&str, &str)>) -> HttpResponse {
    let mut headers = vec![("content-type".to_string(), "text/html".to_string())];
    headers.extend(
        extra_headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    HttpResponse::new(Url::parse(url).unwrap(), 200, headers, body.to_string())
}

#[test]
fn test_passive_detectors_across_a_simulated_crawl() {
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let registry = DetectorRegistry::defaults();

    let pages = vec![
        (
            "http://target.example/",
            html_response(
                "http://target.example/",
                "<html>welcome</html>",
                vec![("x-internal-debug", "on")],
            ),
        ),
        (
            "http://target.example/files/",
            html_response(
                "http://target.example/files/",
                "<html><title>Index of /files</title>Parent Directory</a></html>",
                vec![],
            ),
        ),
        (
            "http://target.example/admin",
            html_response(
                "http://target.example/admin",
                "<html>admin</html>",
                vec![("x-internal-debug", "off")],
            ),
        ),
    ];

    for (url, response) in &pages {
        let req = request(url);
        for detector in registry.passive() {
            session.run_passive(detector.as_ref(), &req, response);
        }
    }

    let listing = session.findings().get("directory_indexing");
    assert_eq!(listing.len(), 1);
    assert_eq!(
        listing[0].locations[0].as_str(),
        "http://target.example/files/"
    );

    // The same uncommon header across two URLs is one grouped finding
    let strange = session.findings().get("strange_headers");
    assert_eq!(strange.len(), 1);
    assert_eq!(strange[0].aggregate_count, 2);
    assert_eq!(strange[0].locations.len(), 2);
}

#[tokio::test]
async fn test_active_detector_with_vulnerable_transport() {
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let detector = ResponseSplittingDetector::new();
    let req = request("http://target.example/redirect?to=home&lang=en");

    // Transport simulating a server that echoes the injected header for
    // the "to" parameter only
    let summary = session
        .run_active(&detector, &req, |mutant| async move {
            let vulnerable = mutant.token_name == "to";
            let mut headers = vec![("content-type".to_string(), "text/html".to_string())];
            if vulnerable {
                headers.push((HEADER_NAME.to_string(), HEADER_VALUE.to_string()));
            }
            let response =
                HttpResponse::new(mutant.mutated_url(), 302, headers, "<html></html>".to_string());
            ProbeOutcome::success(mutant, response)
        })
        .await;

    // Two parameters, three CRLF variants each
    assert_eq!(summary.total, 6);
    assert_eq!(summary.dispatched, 6);
    assert_eq!(summary.failed, 0);

    let findings = session.findings().get("response_splitting");
    assert_eq!(findings.len(), 1, "one grouped finding for the 'to' parameter");
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Medium);
    // Three payload variants hit the same injection point
    assert_eq!(finding.aggregate_count, 3);
}

#[tokio::test]
async fn test_scan_completes_and_reports_despite_transport_failures() {
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let detector = ResponseSplittingDetector::new();
    let req = request("http://flaky.example/page?q=1");

    let calls = AtomicUsize::new(0);
    let calls_ref = &calls;

    let summary = session
        .run_active(&detector, &req, |mutant| async move {
            // First probe times out at the transport, the rest succeed
            // and echo the injected header
            if calls_ref.fetch_add(1, Ordering::SeqCst) == 0 {
                let url = mutant.mutated_url().to_string();
                ProbeOutcome::failure(
                    mutant,
                    TransportError::ConnectionTimeout {
                        url,
                        timeout: std::time::Duration::from_secs(30),
                    },
                )
            } else {
                let headers = vec![(HEADER_NAME.to_string(), HEADER_VALUE.to_string())];
                let response = HttpResponse::new(
                    mutant.mutated_url(),
                    200,
                    headers,
                    "<html></html>".to_string(),
                );
                ProbeOutcome::success(mutant, response)
            }
        })
        .await;

    assert_eq!(summary.dispatched, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(session.failed_probes(), 1);

    // Findings from the probes that did succeed are still reported
    let findings = session.findings().get("response_splitting");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].aggregate_count, 2);
}

#[tokio::test]
async fn test_active_detector_without_injection_points() {
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let detector = ResponseSplittingDetector::new();
    let req = request("http://target.example/static.html");

    let summary = session
        .run_active(&detector, &req, |mutant| async move {
            let response =
                HttpResponse::new(mutant.mutated_url(), 200, vec![], String::new());
            ProbeOutcome::success(mutant, response)
        })
        .await;

    assert_eq!(summary.total, 0);
    assert!(session.findings().get("response_splitting").is_empty());
}

#[test]
fn test_session_teardown_resets_between_scans() {
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let detector = DirectoryIndexingDetector::new();

    let listing = html_response(
        "http://target.example/files/",
        "<html><title>Index of /files</title></html>",
        vec![],
    );
    session.run_passive(&detector, &request("http://target.example/files/"), &listing);
    assert_eq!(session.findings().get("directory_indexing").len(), 1);

    session.teardown();

    // A fresh scan over the same target detects everything again
    session.run_passive(&detector, &request("http://target.example/files/"), &listing);
    assert_eq!(session.findings().get("directory_indexing").len(), 1);
}

#[test]
fn test_strange_headers_value_folding_matches_grep_semantics() {
    // Same header name, different values, different URLs: exactly one
    // finding describing both occurrences
    init_tracing();
    let session = ScanSession::new(EngineConfig::default());
    let detector = StrangeHeadersDetector::new();

    session.run_passive(
        &detector,
        &request("http://www.example.com/1"),
        &html_response("http://www.example.com/1", "Hello world", vec![("hello-world", "yes!")]),
    );
    session.run_passive(
        &detector,
        &request("http://www.example.com/2"),
        &html_response("http://www.example.com/2", "Hello world", vec![("hello-world", "nope")]),
    );

    let findings = session.findings().get("strange_headers");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].aggregate_count, 2);
    let urls: Vec<&str> = findings[0].locations.iter().map(Url::as_str).collect();
    assert_eq!(urls, vec!["http://www.example.com/1", "http://www.example.com/2"]);
}
