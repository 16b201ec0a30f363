//! Writes the per-request report in the archive's historical JSON shape:
//! `baseline`/`final` nested as `{status, length}`, the match flag named
//! `matched_baseline` rather than `matched`, and the field-count objects
//! named `headers`/`body` rather than `header_counts`/`body_counts`.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{CliError, Result};
use reqmin_core::ReportEntry;

#[derive(Serialize)]
struct StatusLength {
    status: Option<u16>,
    length: usize,
}

#[derive(Serialize)]
struct WireFieldCounts {
    original: usize,
    candidates: usize,
    #[serde(rename = "final")]
    final_count: usize,
}

#[derive(Serialize)]
struct WireReportEntry<'a> {
    index: usize,
    method: &'a str,
    url: &'a str,
    path: &'a str,
    query: &'a HashMap<String, Vec<String>>,
    baseline: StatusLength,
    #[serde(rename = "final")]
    final_: StatusLength,
    matched_baseline: bool,
    #[serde(rename = "headers")]
    header_counts: WireFieldCounts,
    #[serde(rename = "body")]
    body_counts: WireFieldCounts,
    minimized_headers: &'a [(String, String)],
    minimized_body: &'a Option<String>,
    error: &'a Option<String>,
}

impl<'a> From<&'a ReportEntry> for WireReportEntry<'a> {
    fn from(entry: &'a ReportEntry) -> Self {
        Self {
            index: entry.index,
            method: &entry.method,
            url: &entry.url,
            path: &entry.path,
            query: &entry.query,
            baseline: StatusLength {
                status: entry.baseline_status,
                length: entry.baseline_length,
            },
            final_: StatusLength {
                status: entry.final_status,
                length: entry.final_length,
            },
            matched_baseline: entry.matched,
            header_counts: WireFieldCounts {
                original: entry.header_counts.original,
                candidates: entry.header_counts.candidates,
                final_count: entry.header_counts.final_count,
            },
            body_counts: WireFieldCounts {
                original: entry.body_counts.original,
                candidates: entry.body_counts.candidates,
                final_count: entry.body_counts.final_count,
            },
            minimized_headers: &entry.minimized_headers,
            minimized_body: &entry.minimized_body,
            error: &entry.error,
        }
    }
}

pub fn write_report(path: &Path, entries: &[ReportEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::report(format!("cannot create {}: {e}", parent.display())))?;
        }
    }

    let wire: Vec<WireReportEntry> = entries.iter().map(WireReportEntry::from).collect();
    let text =
        serde_json::to_string_pretty(&wire).map_err(|e| CliError::report(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, text).map_err(|e| CliError::report(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqmin_core::model::FieldCounts;

    fn sample_entry() -> ReportEntry {
        ReportEntry {
            index: 0,
            method: "GET".to_string(),
            url: "https://example.com/x".to_string(),
            path: "/x".to_string(),
            query: HashMap::new(),
            baseline_status: Some(200),
            baseline_length: 10,
            final_status: Some(200),
            final_length: 8,
            matched: true,
            header_counts: FieldCounts {
                original: 5,
                candidates: 3,
                final_count: 2,
            },
            body_counts: FieldCounts::default(),
            minimized_headers: Vec::new(),
            minimized_body: None,
            error: None,
        }
    }

    #[test]
    fn wire_shape_uses_matched_baseline_and_final_key() {
        let entry = sample_entry();
        let wire = WireReportEntry::from(&entry);
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["matched_baseline"], serde_json::json!(true));
        assert_eq!(value["final"]["status"], serde_json::json!(200));
        assert_eq!(value["headers"]["final"], serde_json::json!(2));
        assert!(value.get("matched").is_none());
        assert!(value.get("header_counts").is_none());
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("nested").join("report.json");
        write_report(&report_path, &[sample_entry()]).unwrap();
        assert!(report_path.exists());
    }
}
