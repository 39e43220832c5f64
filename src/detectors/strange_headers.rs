// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Strange Headers Detector
 * Flags uncommon response headers. Grouping is by header name only, so
 * the same header seen with different values across URLs stays one
 * finding.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde_json::json;
use tracing::debug;

use crate::detectors::PassiveDetector;
use crate::findings::FindingSeed;
use crate::patterns;
use crate::session::ScanSession;
use crate::types::{HttpRequest, HttpResponse, Severity};

pub const CATEGORY: &str = "strange_headers";

#[derive(Default)]
pub struct StrangeHeadersDetector;

impl StrangeHeadersDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PassiveDetector for StrangeHeadersDetector {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, _request: &HttpRequest, response: &HttpResponse, session: &ScanSession) {
        for (name, value) in &response.headers {
            if patterns::is_common_header(name) {
                continue;
            }

            let header_name = name.to_ascii_lowercase();
            debug!("Uncommon header \"{}: {}\" at {}", header_name, value, response.url);

            let description = format!(
                "The remote web server sent the uncommon response header \
                 \"{}\", one of the received header values is \"{}\".",
                header_name, value
            );
            let seed = FindingSeed::new("Strange header", Severity::Info, description)
                .with_evidence(json!({"header": header_name, "value": value}));

            // Header name alone is the group key: differing values must
            // still merge
            session
                .findings()
                .append_unique(CATEGORY, &header_name, response.url.clone(), seed);
        }
    }
}
