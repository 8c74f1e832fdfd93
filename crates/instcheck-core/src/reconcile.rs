use crate::policy::{PolicyFilter, PolicyViolation};
use instcheck_schema::{BuildOptions, ManifestDigest, ManifestEntry, NormalizedManifest};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Raw set difference between the generated and reference manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Required by the reference but not installed.
    pub missing: BTreeSet<ManifestEntry>,
    /// Installed but not expected.
    pub extra: BTreeSet<ManifestEntry>,
}

impl ComparisonResult {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Size and digest of one side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub entries: usize,
    pub digest: ManifestDigest,
}

impl ManifestSummary {
    fn of(manifest: &NormalizedManifest) -> Self {
        Self {
            entries: manifest.len(),
            digest: manifest.digest(),
        }
    }
}

/// Complete outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub generated: ManifestSummary,
    pub reference: ManifestSummary,
    #[serde(flatten)]
    pub comparison: ComparisonResult,
    /// Reference entries dropped from `missing` by a policy exemption.
    pub exempted: BTreeSet<ManifestEntry>,
    pub violations: Vec<PolicyViolation>,
    pub passed: bool,
}

impl ReconciliationReport {
    pub fn missing(&self) -> &BTreeSet<ManifestEntry> {
        &self.comparison.missing
    }

    pub fn extra(&self) -> &BTreeSet<ManifestEntry> {
        &self.comparison.extra
    }
}

/// Compare two normalized manifests under the given build options.
///
/// Pure: no I/O and no state beyond the two inputs, so independent pairs can
/// be reconciled concurrently.
pub fn reconcile(
    generated: &NormalizedManifest,
    reference: &NormalizedManifest,
    options: &BuildOptions,
) -> ReconciliationReport {
    let mut comparison = ComparisonResult {
        missing: reference.difference(generated),
        extra: generated.difference(reference),
    };

    let filter = PolicyFilter::from_options(options);
    let outcome = filter.evaluate(generated);
    let exempted = PolicyFilter::apply_exemptions(&outcome, &mut comparison.missing);
    for entry in &exempted {
        debug!("exempt from missing: {entry}");
    }

    let passed = comparison.is_empty() && outcome.violations.is_empty();
    info!(
        "reconciled {} generated against {} reference entries: {} missing, {} extra, {} policy violations",
        generated.len(),
        reference.len(),
        comparison.missing.len(),
        comparison.extra.len(),
        outcome.violations.len()
    );

    ReconciliationReport {
        generated: ManifestSummary::of(generated),
        reference: ManifestSummary::of(reference),
        comparison,
        exempted,
        violations: outcome.violations,
        passed,
    }
}
