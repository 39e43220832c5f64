// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Finding Registry
 * Per-scan accumulation of findings with group-key deduplication.
 * Semantically equal observations merge into one aggregated record.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use crate::types::Severity;

/// Default cap on representative URLs kept per grouped finding. The
/// aggregate count keeps growing past it.
pub const DEFAULT_LOCATION_CAP: usize = 10;

/// An aggregated, deduplicated record of a detected condition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: String,
    pub group_key: String,
    pub name: String,
    pub severity: Severity,
    pub description: String,
    /// First N URLs the condition was observed at
    pub locations: Vec<Url>,
    /// True total of observations, even when locations is truncated
    pub aggregate_count: u64,
    /// Detector-defined payload/evidence snapshot; opaque to the registry
    pub evidence: Value,
}

/// What a detector supplies on the first observation of a group. Merges
/// keep the original seed and only grow the location list and count.
#[derive(Debug, Clone)]
pub struct FindingSeed {
    pub name: String,
    pub severity: Severity,
    pub description: String,
    pub evidence: Value,
}

impl FindingSeed {
    pub fn new(
        name: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            severity,
            description: description.into(),
            evidence: Value::Null,
        }
    }

    pub fn with_evidence(mut self, evidence: Value) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Owned by one scan session; shared across all concurrent analyze
/// callbacks within it. Mutations serialize on the internal lock, reads
/// never block other readers.
pub struct FindingRegistry {
    location_cap: usize,
    categories: RwLock<HashMap<String, Vec<Finding>>>,
}

impl Default for FindingRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION_CAP)
    }
}

impl FindingRegistry {
    pub fn new(location_cap: usize) -> Self {
        Self {
            location_cap: location_cap.max(1),
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Create a finding for an unseen (category, group_key) pair, or merge
    /// into the existing one: count always increments, the location is
    /// appended only below the cap.
    pub fn append_unique(&self, category: &str, group_key: &str, location: Url, seed: FindingSeed) {
        let mut categories = self.categories.write();
        let findings = categories.entry(category.to_string()).or_default();

        if let Some(existing) = findings.iter_mut().find(|f| f.group_key == group_key) {
            existing.aggregate_count += 1;
            if existing.locations.len() < self.location_cap {
                existing.locations.push(location);
            }
            debug!(
                "Merged finding {}/{} (count={})",
                category, group_key, existing.aggregate_count
            );
            return;
        }

        debug!("New finding {}/{}: {}", category, group_key, seed.name);
        findings.push(Finding {
            category: category.to_string(),
            group_key: group_key.to_string(),
            name: seed.name,
            severity: seed.severity,
            description: seed.description,
            locations: vec![location],
            aggregate_count: 1,
            evidence: seed.evidence,
        });
    }

    /// Current grouped findings for a category, in first-seen order
    pub fn get(&self, category: &str) -> Vec<Finding> {
        self.categories
            .read()
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_one(&self, category: &str, group_key: &str) -> Option<Finding> {
        self.categories
            .read()
            .get(category)
            .and_then(|findings| findings.iter().find(|f| f.group_key == group_key).cloned())
    }

    /// All findings across categories
    pub fn all(&self) -> Vec<Finding> {
        self.categories
            .read()
            .values()
            .flat_map(|findings| findings.iter().cloned())
            .collect()
    }

    /// Number of grouped findings (not raw observations)
    pub fn total_count(&self) -> usize {
        self.categories.read().values().map(Vec::len).sum()
    }

    /// Discard everything; used at scan teardown
    pub fn clear(&self) {
        self.categories.write().clear();
    }
}
