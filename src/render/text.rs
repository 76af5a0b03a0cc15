//! Human-readable report: one block per file, summary line at the end.

use crate::diag::ValidationResult;
use std::fmt::Write;

pub fn render_text(results: &[ValidationResult]) -> String {
    let mut out = String::new();

    for result in results {
        let marker = if result.valid { "ok  " } else { "FAIL" };
        let _ = writeln!(out, "{} {}", marker, result.file);
        for d in &result.diagnostics {
            let _ = write!(
                out,
                "  {:<7} {:<24} {}: {}",
                d.severity.label(),
                d.code,
                d.path,
                d.message
            );
            if let Some(loc) = d.location {
                let _ = write!(out, " [{}:{}]", loc.line, loc.column);
            }
            out.push('\n');
        }
    }

    let total = results.len();
    let passed = results.iter().filter(|r| r.valid).count();
    let errors: usize = results.iter().map(ValidationResult::error_count).sum();
    let warnings: usize = results.iter().map(ValidationResult::warning_count).sum();
    let _ = writeln!(
        out,
        "\n{} file(s) checked, {} passed, {} error(s), {} warning(s)",
        total, passed, errors, warnings
    );

    out
}

#[cfg(test)]
mod tests {
    use crate::diag::{aggregate, codes, Diagnostic, FieldPath};
    use super::*;

    #[test]
    fn groups_by_file_and_summarizes() {
        let ok = aggregate("docs/a.ospec.yml", vec![], vec![]);
        let bad = aggregate(
            "docs/b.ospec.yml",
            vec![Diagnostic::error(
                codes::INVALID_FORMAT,
                FieldPath::of("id"),
                "'Bad' is not a kebab-case identifier",
            )],
            vec![],
        );
        let text = render_text(&[ok, bad]);

        assert!(text.contains("ok   docs/a.ospec.yml"));
        assert!(text.contains("FAIL docs/b.ospec.yml"));
        assert!(text.contains("invalid_format"));
        assert!(text.contains("2 file(s) checked, 1 passed, 1 error(s), 0 warning(s)"));
    }
}
