// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Ansa Detection Engine
 * Shared detection-and-dispatch core for the Ansa web application
 * scanner: multi-pattern response matching, probabilistic dedup of
 * scanned resources, bounded-concurrency probe dispatch and grouped
 * finding accumulation. Vulnerability heuristics live in detectors that
 * plug into this engine.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod errors;
pub mod types;

// Matching engine and the pattern tables it consumes
pub mod matching;
pub mod patterns;

// Per-scan state: dedup filter and finding registry
pub mod findings;
pub mod membership;

// Probe dispatch
pub mod dispatch;

// Detector contract and built-in detectors
pub mod detectors;

// Per-scan lifecycle glue
pub mod session;

pub use config::{EngineConfig, MembershipConfig};
pub use dispatch::{DispatchHandle, DispatchSummary, ProbeDispatcher};
pub use errors::{EngineError, EngineResult, TransportError};
pub use findings::{Finding, FindingRegistry, FindingSeed};
pub use matching::{
    ClassificationFilter, MatchConfig, MatchResult, MultiPatternMatcher, PatternSetBuilder,
    SubstringMultiMatcher,
};
pub use membership::MembershipFilter;
pub use session::ScanSession;
pub use types::{HttpRequest, HttpResponse, Mutant, ProbeOutcome, Severity};
