// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probabilistic Membership Filter
 * Growable Bloom filter chain gating expensive per-response work to once
 * per distinct resource. No false negatives; bounded false positives.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::f64::consts::LN_2;
use tracing::debug;

use crate::config::MembershipConfig;

/// One fixed-capacity Bloom sub-filter
struct BloomSlice {
    bits: Vec<u64>,
    bit_count: u64,
    hash_count: u32,
    capacity: usize,
    inserted: usize,
}

impl BloomSlice {
    fn with_capacity(capacity: usize, error_rate: f64) -> Self {
        let n = capacity.max(1) as f64;
        // Standard Bloom sizing: m = -n ln p / (ln 2)^2, k = (m/n) ln 2
        let bit_count = (-(n * error_rate.ln()) / (LN_2 * LN_2)).ceil().max(64.0) as u64;
        let hash_count = ((bit_count as f64 / n) * LN_2).round().max(1.0) as u32;
        let words = bit_count.div_ceil(64) as usize;
        Self {
            bits: vec![0u64; words],
            bit_count,
            hash_count,
            capacity: capacity.max(1),
            inserted: 0,
        }
    }

    fn bit_positions(&self, h1: u64, h2: u64) -> impl Iterator<Item = u64> + '_ {
        (0..self.hash_count as u64).map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % self.bit_count)
    }

    fn insert(&mut self, h1: u64, h2: u64) {
        for pos in (0..self.hash_count as u64)
            .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % self.bit_count)
        {
            self.bits[(pos / 64) as usize] |= 1 << (pos % 64);
        }
        self.inserted += 1;
    }

    fn contains(&self, h1: u64, h2: u64) -> bool {
        self.bit_positions(h1, h2)
            .all(|pos| self.bits[(pos / 64) as usize] & (1 << (pos % 64)) != 0)
    }

    fn is_full(&self) -> bool {
        self.inserted >= self.capacity
    }
}

/// Probabilistic "already processed" set. Grows by chaining sub-filters
/// with doubled capacity and a tightened error budget, so accuracy does
/// not collapse as element count climbs. Safe for concurrent add/contains
/// from probe-analysis callbacks.
pub struct MembershipFilter {
    config: MembershipConfig,
    chain: RwLock<Vec<BloomSlice>>,
}

impl Default for MembershipFilter {
    fn default() -> Self {
        Self::new(MembershipConfig::default())
    }
}

impl MembershipFilter {
    pub fn new(config: MembershipConfig) -> Self {
        let first = BloomSlice::with_capacity(config.initial_capacity, config.error_rate);
        Self {
            config,
            chain: RwLock::new(vec![first]),
        }
    }

    /// Record a key. Growth is internal and never fails the caller.
    pub fn add(&self, key: &str) {
        let (h1, h2) = hash_pair(key);
        let mut chain = self.chain.write();

        // Re-adding a present key would inflate the active slice's load
        // for nothing
        if chain.iter().any(|slice| slice.contains(h1, h2)) {
            return;
        }

        if chain
            .last()
            .map(|slice| slice.is_full())
            .unwrap_or(true)
        {
            let generation = chain.len() as u32;
            let capacity = self
                .config
                .initial_capacity
                .saturating_mul(self.config.growth_factor.saturating_pow(generation));
            let error_rate =
                self.config.error_rate * self.config.tightening_ratio.powi(generation as i32);
            debug!(
                "Membership filter growing: sub-filter #{} capacity={} error_rate={:.6}",
                generation + 1,
                capacity,
                error_rate
            );
            chain.push(BloomSlice::with_capacity(capacity, error_rate));
        }

        // Chain is never empty
        chain
            .last_mut()
            .expect("membership chain is non-empty")
            .insert(h1, h2);
    }

    /// Once a key was added this returns true forever; for never-added
    /// keys it may return true with probability near the configured rate.
    pub fn contains(&self, key: &str) -> bool {
        let (h1, h2) = hash_pair(key);
        self.chain
            .read()
            .iter()
            .any(|slice| slice.contains(h1, h2))
    }

    /// Number of distinct keys recorded (as observed at insert time)
    pub fn len(&self) -> usize {
        self.chain.read().iter().map(|slice| slice.inserted).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the sub-filter chain; exposed for diagnostics and tests
    pub fn sub_filter_count(&self) -> usize {
        self.chain.read().len()
    }

    /// Discard everything; used at scan teardown
    pub fn clear(&self) {
        let mut chain = self.chain.write();
        chain.clear();
        chain.push(BloomSlice::with_capacity(
            self.config.initial_capacity,
            self.config.error_rate,
        ));
    }
}

/// Two independent 64-bit hashes from one digest, combined with double
/// hashing for the k bit positions. h2 is forced odd so strides cover the
/// whole table.
fn hash_pair(key: &str) -> (u64, u64) {
    let digest = Sha256::digest(key.as_bytes());
    let h1 = u64::from_le_bytes(digest[0..8].try_into().expect("digest is 32 bytes"));
    let h2 = u64::from_le_bytes(digest[8..16].try_into().expect("digest is 32 bytes"));
    (h1, h2 | 1)
}
