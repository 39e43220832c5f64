// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Classification False-Positive Filter
 * Policy layer applied between a raw pattern match and a recorded
 * finding
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::collections::BTreeSet;
use tracing::debug;

use crate::matching::multi_re::MatchResult;

/// Tags whose detection is weak enough that a client-side scripting
/// content type overrules the match
const SERVER_SIDE_TAGS: &[&str] = &["PHP", "ASP", "JSP", "ASPX"];

/// Rejects technically-matching results that experience shows are noise:
/// XML/packet markers misread as source code, server-side matches inside
/// declared JavaScript, and matches spanning large binary payloads.
#[derive(Debug, Clone)]
pub struct ClassificationFilter {
    denylist: Vec<String>,
    printable_ratio: f64,
}

impl Default for ClassificationFilter {
    fn default() -> Self {
        Self {
            denylist: vec!["xml".to_string(), "xpacket".to_string()],
            printable_ratio: 0.9,
        }
    }
}

impl ClassificationFilter {
    pub fn new(denylist: Vec<String>, printable_ratio: f64) -> Self {
        Self {
            denylist,
            printable_ratio,
        }
    }

    /// True if the match should be discarded. Not an error: the pattern
    /// did match, the result is just not trustworthy.
    pub fn is_false_positive(
        &self,
        matched_text: &str,
        tags: &BTreeSet<String>,
        content_type: Option<&str>,
    ) -> bool {
        for denied in &self.denylist {
            if matched_text.contains(denied.as_str()) {
                debug!("Match rejected by denylist entry '{}'", denied);
                return true;
            }
        }

        if let Some(ct) = content_type {
            if ct.to_ascii_lowercase().contains("javascript")
                && tags.iter().any(|t| SERVER_SIDE_TAGS.contains(&t.as_str()))
            {
                debug!("Server-side match rejected inside '{}' response", ct);
                return true;
            }
        }

        if matched_text.is_empty() {
            return true;
        }

        let total = matched_text.chars().count();
        let printable = matched_text.chars().filter(|&c| is_printable(c)).count();
        if (printable as f64) / (total as f64) < self.printable_ratio {
            debug!(
                "Match rejected: only {}/{} printable characters",
                printable, total
            );
            return true;
        }

        false
    }

    /// Convenience wrapper for raw matcher output
    pub fn accept(&self, result: &MatchResult, content_type: Option<&str>) -> bool {
        !self.is_false_positive(&result.matched_text, &result.tags, content_type)
    }
}

/// ASCII-printable plus the whitespace control characters that show up in
/// rendered source
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}
