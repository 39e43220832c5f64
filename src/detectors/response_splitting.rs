// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Response Splitting Detector
 * Injects CRLF header payloads into every injection point and verifies
 * whether the crafted header is echoed back by the server
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use once_cell::sync::Lazy;
use serde_json::json;
use tracing::{debug, info};

use crate::detectors::ActiveDetector;
use crate::findings::FindingSeed;
use crate::session::ScanSession;
use crate::types::{HttpRequest, Mutant, ProbeOutcome, Severity};

pub const CATEGORY: &str = "response_splitting";

/// Header the payloads try to smuggle into the response
pub const HEADER_NAME: &str = "vulnerable073b";
pub const HEADER_VALUE: &str = "ae5c0d0a";

/// Framework errors produced when header modification is attempted after
/// output already started; they prove the parameter reaches a header API
const HEADER_ERRORS: &[&str] = &[
    "Header may not contain more than a single header, new line detected",
    "Cannot modify header information - headers already sent",
];

static HEADER_INJECTION_TESTS: Lazy<Vec<String>> = Lazy::new(|| {
    ["\r\n", "\r", "\n"]
        .iter()
        .map(|sep| format!("ansa{sep}{HEADER_NAME}: {HEADER_VALUE}"))
        .collect()
});

#[derive(Default)]
pub struct ResponseSplittingDetector;

impl ResponseSplittingDetector {
    pub fn new() -> Self {
        Self
    }

    /// Full injection: our header name and value both appear in the
    /// response headers
    fn header_was_injected(headers: &[(String, String)]) -> bool {
        headers.iter().any(|(name, value)| {
            name.to_ascii_lowercase().contains(HEADER_NAME)
                && value.to_ascii_lowercase().contains(HEADER_VALUE)
        })
    }

    /// Partial injection: the header name made it through but the value
    /// did not; worth reporting for manual verification
    fn header_partially_injected(headers: &[(String, String)]) -> bool {
        headers.iter().any(|(name, value)| {
            name.to_ascii_lowercase().contains(HEADER_NAME)
                && !value.to_ascii_lowercase().contains(HEADER_VALUE)
        })
    }

    fn report_header_errors(&self, outcome: &ProbeOutcome, body: &str, session: &ScanSession) {
        for error in HEADER_ERRORS {
            if !body.contains(error) {
                continue;
            }

            let mutant = &outcome.mutant;
            let description = format!(
                "The variable \"{}\" at URL \"{}\" modifies the HTTP response \
                 headers, but this error was sent while testing for response \
                 splitting: \"{}\".",
                mutant.token_name, mutant.request.url, error
            );
            let group_key = format!("header-error|{}|{}", mutant.request.url, mutant.token_name);
            session.findings().append_unique(
                CATEGORY,
                &group_key,
                mutant.request.url.clone(),
                FindingSeed::new(
                    "Parameter modifies response headers",
                    Severity::Info,
                    description,
                )
                .with_evidence(json!({"error": error, "parameter": mutant.token_name})),
            );
            break;
        }
    }
}

impl ActiveDetector for ResponseSplittingDetector {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn generate_mutants(&self, request: &HttpRequest) -> Vec<Mutant> {
        Mutant::create_mutants(request, &HEADER_INJECTION_TESTS)
    }

    fn analyze_outcome(&self, outcome: &ProbeOutcome, session: &ScanSession) {
        let Some(response) = outcome.response() else {
            debug!(
                "Skipping response splitting analysis, probe failed: {:?}",
                outcome.error()
            );
            return;
        };

        self.report_header_errors(outcome, &response.body, session);

        let mutant = &outcome.mutant;
        let group_key = format!("{}|{}", mutant.request.url, mutant.token_name);

        if Self::header_was_injected(&response.headers) {
            info!("Response splitting found at {}", mutant.found_at());
            let description = format!("Response splitting was found at: {}", mutant.found_at());
            session.findings().append_unique(
                CATEGORY,
                &group_key,
                mutant.request.url.clone(),
                FindingSeed::new(
                    "Response splitting vulnerability",
                    Severity::Medium,
                    description,
                )
                .with_evidence(json!({"payload": mutant.payload, "parameter": mutant.token_name})),
            );
        } else if Self::header_partially_injected(&response.headers) {
            let description = format!(
                "The vulnerable header was added to the HTTP response, but the \
                 value is not what was expected ({}: {}). Please verify \
                 manually.",
                HEADER_NAME, HEADER_VALUE
            );
            session.findings().append_unique(
                CATEGORY,
                &group_key,
                mutant.request.url.clone(),
                FindingSeed::new(
                    "Parameter modifies response headers",
                    Severity::Info,
                    description,
                )
                .with_evidence(json!({"payload": mutant.payload, "parameter": mutant.token_name})),
            );
        }
    }
}
