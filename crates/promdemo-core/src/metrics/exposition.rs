//! Prometheus text exposition format (version 0.0.4) encoder.

use std::fmt::Write;

use super::{MetricFamily, Value};

/// Content type announced by the `/metrics` endpoint.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// HELP text escapes backslash and newline only.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: Value) -> String {
    match v {
        Value::Int(n) => n.to_string(),
        Value::Float(f) if f.is_nan() => "NaN".to_string(),
        Value::Float(f) if f.is_infinite() => {
            if f > 0.0 { "+Inf".to_string() } else { "-Inf".to_string() }
        }
        Value::Float(f) => f.to_string(),
    }
}

/// Append one family: `# HELP`, `# TYPE`, then one line per sample.
pub fn encode_family(family: &MetricFamily, out: &mut String) {
    let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
    let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
    for s in &family.samples {
        if s.labels.is_empty() {
            let _ = writeln!(out, "{} {}", family.name, format_value(s.value));
        } else {
            let label_str = s.labels.iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>().join(",");
            let _ = writeln!(out, "{}{{{}}} {}", family.name, label_str, format_value(s.value));
        }
    }
}

/// Encode a full scrape.
pub fn encode(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for f in families {
        encode_family(f, &mut out);
    }
    out
}
