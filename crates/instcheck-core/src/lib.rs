//! Reconciliation engine for install manifests.
//!
//! This crate compares a generated install manifest against a reference one:
//! it loads and normalizes both (`check_manifests`), computes the set
//! difference (`reconcile`), applies configuration-derived policy rules
//! (`PolicyFilter`), and renders the outcome as diagnostics (`render_text`).

pub mod engine;
pub mod policy;
pub mod reconcile;
pub mod report;

pub use engine::{check_manifests, load_normalized, CheckConfig};
pub use policy::{PolicyFilter, PolicyOutcome, PolicyRule, PolicyViolation};
pub use reconcile::{reconcile, ComparisonResult, ManifestSummary, ReconciliationReport};
pub use report::{exit_status, render_text, EXIT_MISMATCH, EXIT_RECONCILED};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] instcheck_schema::ManifestError),
    #[error("config error: {0}")]
    Config(#[from] instcheck_schema::ConfigError),
}
