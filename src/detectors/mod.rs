// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Detector Contract & Registry
 * Fixed entry-point traits for passive and active detectors, resolved
 * through an explicit table instead of reflection
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::session::ScanSession;
use crate::types::{HttpRequest, HttpResponse, Mutant, ProbeOutcome};

pub mod directory_indexing;
pub mod response_splitting;
pub mod source_code;
pub mod strange_headers;

pub use directory_indexing::DirectoryIndexingDetector;
pub use response_splitting::ResponseSplittingDetector;
pub use source_code::SourceCodeDetector;
pub use strange_headers::StrangeHeadersDetector;

/// A detector that inspects traffic it did not generate. Invoked once per
/// (request, response) pair; findings go through the session registry.
pub trait PassiveDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, request: &HttpRequest, response: &HttpResponse, session: &ScanSession);
}

/// A detector that crafts its own probes. Mutant generation and outcome
/// analysis are separate so the dispatcher owns everything in between.
pub trait ActiveDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate_mutants(&self, request: &HttpRequest) -> Vec<Mutant>;
    fn analyze_outcome(&self, outcome: &ProbeOutcome, session: &ScanSession);
}

/// Explicit detector table. Adding a detector means registering it here,
/// not teaching the engine new control flow.
#[derive(Default)]
pub struct DetectorRegistry {
    passive: Vec<Box<dyn PassiveDetector>>,
    active: Vec<Box<dyn ActiveDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in detectors
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        registry.register_passive(Box::new(DirectoryIndexingDetector::new()));
        registry.register_passive(Box::new(SourceCodeDetector::new()));
        registry.register_passive(Box::new(StrangeHeadersDetector::new()));
        registry.register_active(Box::new(ResponseSplittingDetector::new()));
        registry
    }

    pub fn register_passive(&mut self, detector: Box<dyn PassiveDetector>) {
        self.passive.push(detector);
    }

    pub fn register_active(&mut self, detector: Box<dyn ActiveDetector>) {
        self.active.push(detector);
    }

    pub fn passive(&self) -> &[Box<dyn PassiveDetector>] {
        &self.passive
    }

    pub fn active(&self) -> &[Box<dyn ActiveDetector>] {
        &self.active
    }

    pub fn passive_by_name(&self, name: &str) -> Option<&dyn PassiveDetector> {
        self.passive
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
    }

    pub fn active_by_name(&self, name: &str) -> Option<&dyn ActiveDetector> {
        self.active
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
    }
}
