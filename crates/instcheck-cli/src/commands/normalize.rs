use super::{json_pretty, EXIT_SUCCESS};
use instcheck_core::{load_normalized, CheckConfig};
use std::path::Path;

pub fn run(manifest: &Path, config: &CheckConfig, json: bool) -> Result<u8, String> {
    let normalized = load_normalized(manifest, &config.load, &config.normalizer())
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "entries": normalized,
            "digest": normalized.digest(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for entry in &normalized {
            println!("{entry}");
        }
    }
    Ok(EXIT_SUCCESS)
}
