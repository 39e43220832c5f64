// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Engine Configuration
 * Per-scan engine tunables with serde defaults
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::matching::MatchConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum probe sends in flight at once
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Per-probe deadline in seconds; 0 disables the guard and leaves
    /// timeouts entirely to the transport
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Maximum representative URLs kept per grouped finding
    #[serde(default = "default_location_cap")]
    pub location_cap: usize,

    #[serde(default)]
    pub membership: MembershipConfig,

    #[serde(default)]
    pub matching: MatchConfig,
}

fn default_concurrency_limit() -> usize {
    20
}

fn default_probe_timeout_secs() -> u64 {
    30
}

fn default_location_cap() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            probe_timeout_secs: default_probe_timeout_secs(),
            location_cap: default_location_cap(),
            membership: MembershipConfig::default(),
            matching: MatchConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn probe_timeout(&self) -> Option<Duration> {
        if self.probe_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.probe_timeout_secs))
        }
    }
}

/// Sizing for the scalable membership filter chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipConfig {
    /// Capacity of the first sub-filter
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Overall false-positive target
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Capacity multiplier applied to each appended sub-filter
    #[serde(default = "default_growth_factor")]
    pub growth_factor: usize,

    /// Error budget multiplier applied to each appended sub-filter, keeps
    /// the compound false-positive rate near the target as the chain grows
    #[serde(default = "default_tightening_ratio")]
    pub tightening_ratio: f64,
}

fn default_initial_capacity() -> usize {
    1000
}

fn default_error_rate() -> f64 {
    0.001
}

fn default_growth_factor() -> usize {
    2
}

fn default_tightening_ratio() -> f64 {
    0.9
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            error_rate: default_error_rate(),
            growth_factor: default_growth_factor(),
            tightening_ratio: default_tightening_ratio(),
        }
    }
}
