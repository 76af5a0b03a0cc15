//! Structured machine-readable report (JSON).

use crate::diag::ValidationResult;
use crate::Result;

pub fn render_json(results: &[ValidationResult]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(results)?;
    out.push('\n');
    Ok(out)
}
