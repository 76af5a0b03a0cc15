//! Test-report XML: one testcase per validated file, one failure element per
//! Error diagnostic. Warnings and info notes do not fail a testcase.

use crate::diag::{Severity, ValidationResult};

pub fn render_junit(results: &[ValidationResult]) -> String {
    let tests = results.len();
    let failures = results.iter().filter(|r| !r.valid).count();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuites tests=\"{}\" failures=\"{}\" errors=\"0\">",
        tests, failures
    ));
    out.push_str(&format!(
        "<testsuite name=\"ospec\" tests=\"{}\" failures=\"{}\" errors=\"0\">",
        tests, failures
    ));

    for result in results {
        out.push_str(&format!(
            "<testcase classname=\"ospec\" name=\"{}\">",
            xml_escape(&result.file)
        ));
        for d in &result.diagnostics {
            if d.severity != Severity::Error {
                continue;
            }
            let detail = match d.location {
                Some(loc) => format!("{} ({}:{}): {}", d.path, loc.line, loc.column, d.message),
                None => format!("{}: {}", d.path, d.message),
            };
            out.push_str(&format!(
                "<failure message=\"{}\" type=\"{}\">{}</failure>",
                xml_escape(&d.message),
                xml_escape(d.code),
                xml_escape(&detail)
            ));
        }
        out.push_str("</testcase>");
    }

    out.push_str("</testsuite></testsuites>\n");
    out
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
