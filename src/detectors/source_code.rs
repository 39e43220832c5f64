// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Source Code Disclosure Detector
 * Finds server-side source leaked into response bodies, filtered through
 * the classification false-positive policy
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde_json::json;
use tracing::debug;

use crate::detectors::PassiveDetector;
use crate::findings::FindingSeed;
use crate::matching::ClassificationFilter;
use crate::patterns;
use crate::session::ScanSession;
use crate::types::{HttpRequest, HttpResponse, Severity};

pub const CATEGORY: &str = "source_code";

/// Evidence snippets longer than this are truncated
const MAX_EVIDENCE_LEN: usize = 100;

pub struct SourceCodeDetector {
    filter: ClassificationFilter,
}

impl Default for SourceCodeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceCodeDetector {
    pub fn new() -> Self {
        Self {
            filter: ClassificationFilter::default(),
        }
    }
}

impl PassiveDetector for SourceCodeDetector {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, _request: &HttpRequest, response: &HttpResponse, session: &ScanSession) {
        // Namespaced so other detectors sharing the filter never collide
        let key = format!("{CATEGORY}|{}", response.url);
        if session.seen().contains(&key) {
            return;
        }
        session.seen().add(&key);

        for result in patterns::source_code_matcher().query(&response.body) {
            if !self.filter.accept(&result, response.content_type()) {
                continue;
            }

            let languages: Vec<&str> = result.tags.iter().map(String::as_str).collect();
            debug!(
                "Source code ({}) disclosed at {}",
                languages.join(", "),
                response.url
            );

            let description = format!(
                "The URL \"{}\" has a source code disclosure vulnerability; the \
                 leaked code appears to be {}.",
                response.url,
                languages.join(" or ")
            );
            let seed = FindingSeed::new("Source code disclosure", Severity::Medium, description)
                .with_evidence(json!({
                    "match": truncate_on_boundary(&result.matched_text, MAX_EVIDENCE_LEN),
                    "languages": languages,
                }));
            session
                .findings()
                .append_unique(CATEGORY, response.url.as_str(), response.url.clone(), seed);

            // One disclosure per response is enough evidence
            break;
        }
    }
}

/// Truncate at the largest char boundary at or below `max`, so evidence
/// slicing never panics on multi-byte text
fn truncate_on_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
