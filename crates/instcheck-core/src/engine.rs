use crate::reconcile::{reconcile, ReconciliationReport};
use crate::CoreError;
use instcheck_schema::{
    load_manifest_file, BuildOptions, CheckProfile, LoadOptions, NormalizeOptions,
    NormalizedManifest, PathNormalizer,
};
use std::path::Path;
use tracing::{debug, trace};

/// Everything one reconciliation run needs besides the two manifest files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConfig {
    pub load: LoadOptions,
    pub normalize: NormalizeOptions,
    pub build: BuildOptions,
}

impl CheckConfig {
    pub fn from_profile(profile: &CheckProfile) -> Result<Self, CoreError> {
        Ok(Self {
            load: profile.load_options(),
            normalize: profile.normalize_options(),
            build: profile.build_options()?,
        })
    }

    pub fn normalizer(&self) -> PathNormalizer {
        PathNormalizer::new(&self.normalize)
    }
}

/// Load one manifest file and run it through the normalization pipeline.
pub fn load_normalized(
    path: &Path,
    load: &LoadOptions,
    normalizer: &PathNormalizer,
) -> Result<NormalizedManifest, CoreError> {
    let raw = load_manifest_file(path, load)?;
    let manifest = normalizer.normalize_all(&raw);
    debug!(
        "{}: {} raw entries, {} after normalization",
        path.display(),
        raw.len(),
        manifest.len()
    );
    for entry in &manifest {
        trace!("  {entry}");
    }
    Ok(manifest)
}

/// Load both manifests and reconcile them.
///
/// The two files are read on separate scoped threads; any input error is
/// returned before a comparison takes place.
pub fn check_manifests(
    generated_path: &Path,
    reference_path: &Path,
    config: &CheckConfig,
) -> Result<ReconciliationReport, CoreError> {
    let normalizer = config.normalizer();

    let (generated, reference) = std::thread::scope(|s| {
        let generated = s.spawn(|| load_normalized(generated_path, &config.load, &normalizer));
        let reference = load_normalized(reference_path, &config.load, &normalizer);
        let generated = generated
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (generated, reference)
    });

    Ok(reconcile(&generated?, &reference?, &config.build))
}
