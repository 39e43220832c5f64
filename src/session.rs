// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Session
 * Owns the per-scan membership filter and finding registry, and wires
 * active detectors through the probe dispatcher. One session, one scan;
 * teardown discards everything.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::detectors::{ActiveDetector, PassiveDetector};
use crate::dispatch::{DispatchSummary, ProbeDispatcher};
use crate::findings::FindingRegistry;
use crate::membership::MembershipFilter;
use crate::types::{HttpRequest, HttpResponse, Mutant, ProbeOutcome};

pub struct ScanSession {
    config: EngineConfig,
    seen: MembershipFilter,
    findings: FindingRegistry,
    probes_sent: AtomicUsize,
    probes_failed: AtomicUsize,
}

impl ScanSession {
    pub fn new(config: EngineConfig) -> Self {
        let seen = MembershipFilter::new(config.membership.clone());
        let findings = FindingRegistry::new(config.location_cap);
        Self {
            config,
            seen,
            findings,
            probes_sent: AtomicUsize::new(0),
            probes_failed: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-scan "already processed" filter shared by all detectors
    pub fn seen(&self) -> &MembershipFilter {
        &self.seen
    }

    pub fn findings(&self) -> &FindingRegistry {
        &self.findings
    }

    /// Feed one observed (request, response) pair to a passive detector
    pub fn run_passive(
        &self,
        detector: &dyn PassiveDetector,
        request: &HttpRequest,
        response: &HttpResponse,
    ) {
        debug!("Running passive detector {} on {}", detector.name(), response.url);
        detector.analyze(request, response, self);
    }

    /// Generate an active detector's mutants, dispatch them through the
    /// transport, and feed every outcome back to the detector
    pub async fn run_active<S, Fut>(
        &self,
        detector: &dyn ActiveDetector,
        request: &HttpRequest,
        send: S,
    ) -> DispatchSummary
    where
        S: Fn(Mutant) -> Fut + Send + Sync,
        Fut: Future<Output = ProbeOutcome> + Send,
    {
        let mutants = detector.generate_mutants(request);
        if mutants.is_empty() {
            debug!(
                "Active detector {} produced no mutants for {}",
                detector.name(),
                request.url
            );
            return DispatchSummary::default();
        }

        let dispatcher = ProbeDispatcher::new(self.config.concurrency_limit)
            .with_timeout(self.config.probe_timeout());
        let summary = dispatcher
            .dispatch(mutants, send, |outcome, _handle| {
                detector.analyze_outcome(&outcome, self);
            })
            .await;

        self.probes_sent.fetch_add(summary.dispatched, Ordering::Relaxed);
        self.probes_failed.fetch_add(summary.failed, Ordering::Relaxed);

        info!(
            "Detector {} on {}: {} probes, {} failed",
            detector.name(),
            request.url,
            summary.dispatched,
            summary.failed
        );
        summary
    }

    pub fn probes_sent(&self) -> usize {
        self.probes_sent.load(Ordering::Relaxed)
    }

    /// Advisory count of probes lost to transport failures; a scan with
    /// failures still completes and reports what succeeded
    pub fn failed_probes(&self) -> usize {
        self.probes_failed.load(Ordering::Relaxed)
    }

    /// Discard all per-scan state. The session can be reused afterwards,
    /// but nothing recorded before survives.
    pub fn teardown(&self) {
        info!(
            "Scan teardown: {} findings, {} probes sent, {} failed",
            self.findings.total_count(),
            self.probes_sent(),
            self.failed_probes()
        );
        self.findings.clear();
        self.seen.clear();
        self.probes_sent.store(0, Ordering::Relaxed);
        self.probes_failed.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::FindingSeed;
    use crate::types::Severity;
    use url::Url;

    #[test]
    fn test_teardown_discards_state() {
        let session = ScanSession::new(EngineConfig::default());
        session.seen().add("http://example.com/dir/");
        session.findings().append_unique(
            "category",
            "key",
            Url::parse("http://example.com/").unwrap(),
            FindingSeed::new("name", Severity::Info, "desc"),
        );

        session.teardown();

        assert!(!session.seen().contains("http://example.com/dir/"));
        assert_eq!(session.findings().total_count(), 0);
        assert_eq!(session.probes_sent(), 0);
    }
}
