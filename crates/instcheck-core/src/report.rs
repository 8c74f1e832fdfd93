use crate::reconcile::ReconciliationReport;
use instcheck_schema::ManifestEntry;
use std::collections::BTreeSet;
use std::io::{self, Write};

pub const EXIT_RECONCILED: u8 = 0;
pub const EXIT_MISMATCH: u8 = 1;

/// Terminal status for a report: zero only when nothing is missing, nothing
/// is extra, and no policy rule was violated.
pub fn exit_status(report: &ReconciliationReport) -> u8 {
    if report.passed {
        EXIT_RECONCILED
    } else {
        EXIT_MISMATCH
    }
}

/// Write the report as line-prefixed diagnostics and return its exit status.
///
/// Missing and extra entries are already sorted; policy violations follow
/// under their own heading.
pub fn render_text(report: &ReconciliationReport, out: &mut impl Write) -> io::Result<u8> {
    write_section(out, "files missing from installation", report.missing())?;
    write_section(out, "unexpected files installed", report.extra())?;

    if !report.violations.is_empty() {
        writeln!(out, "error: policy violations:")?;
        for v in &report.violations {
            writeln!(out, "  {}:", v.message)?;
            for path in &v.paths {
                writeln!(out, "    {path}")?;
            }
        }
    }

    if report.passed {
        writeln!(out, "success: the installed files match the reference manifest")?;
    }
    Ok(exit_status(report))
}

fn write_section(
    out: &mut impl Write,
    heading: &str,
    entries: &BTreeSet<ManifestEntry>,
) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "error: {heading}:")?;
    for entry in entries {
        writeln!(out, "  {entry}")?;
    }
    Ok(())
}
