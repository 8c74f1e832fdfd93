use super::{colorize_failure, failure_summary, json_pretty};
use instcheck_core::{check_manifests, exit_status, render_text, CheckConfig};
use std::io::Write;
use std::path::Path;

pub fn run(
    generated: &Path,
    reference: &Path,
    config: &CheckConfig,
    json: bool,
) -> Result<u8, String> {
    let report = check_manifests(generated, reference, config).map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&report)?);
        return Ok(exit_status(&report));
    }

    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let code =
        render_text(&report, &mut out).map_err(|e| format!("failed to write report: {e}"))?;
    if !report.passed {
        writeln!(
            out,
            "{}",
            colorize_failure(&format!("check failed: {}", failure_summary(&report)))
        )
        .map_err(|e| format!("failed to write report: {e}"))?;
    }
    Ok(code)
}
