// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Directory Indexing Detector
 * Greps responses for web server directory listing markers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use tracing::debug;

use crate::detectors::PassiveDetector;
use crate::findings::FindingSeed;
use crate::patterns;
use crate::session::ScanSession;
use crate::types::{HttpRequest, HttpResponse, Severity};

pub const CATEGORY: &str = "directory_indexing";

#[derive(Default)]
pub struct DirectoryIndexingDetector;

impl DirectoryIndexingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PassiveDetector for DirectoryIndexingDetector {
    fn name(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, _request: &HttpRequest, response: &HttpResponse, session: &ScanSession) {
        if !response.is_text_or_html() {
            return;
        }

        // One scan per directory is enough; listings don't change per file.
        // The key is namespaced so other detectors gating on the same
        // filter never collide.
        let directory = format!("{CATEGORY}|{}", response.domain_path());
        if session.seen().contains(&directory) {
            return;
        }
        session.seen().add(&directory);

        if patterns::dir_indexing_matcher().matches_any(&response.body) {
            debug!("Directory listing markers in {}", response.url);
            let description = format!(
                "The URL \"{}\" has a directory indexing vulnerability.",
                response.url
            );
            session.findings().append_unique(
                CATEGORY,
                response.url.as_str(),
                response.url.clone(),
                FindingSeed::new("Directory indexing", Severity::Low, description),
            );
        }
    }
}
