//! Reads and writes HAR (HTTP Archive) files.
//!
//! The archive is kept around as a raw `serde_json::Value` tree rather
//! than a typed struct so that fields this tool doesn't understand
//! (browser metadata, timings, cache info) survive an export unchanged.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{CliError, Result};
use reqmin_core::{MinimizationResult, ProcessedRequest, RequestData};

pub struct Archive {
    root: Value,
}

impl Archive {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::archive(format!("cannot read {}: {e}", path.display())))?;
        let root: Value = serde_json::from_str(&text)
            .map_err(|e| CliError::archive(format!("malformed HAR in {}: {e}", path.display())))?;

        if root.pointer("/log/entries").and_then(Value::as_array).is_none() {
            return Err(CliError::archive(format!("{}: missing log.entries array", path.display())));
        }

        Ok(Self { root })
    }

    /// Decomposes every `log.entries[]` request into engine-ready `RequestData`,
    /// indexed by its original position in the archive.
    pub fn requests(&self) -> Vec<RequestData> {
        let entries = self
            .root
            .pointer("/log/entries")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| parse_entry(index, entry))
            .collect()
    }

    /// Writes the minimized headers/body back into a deep copy of the
    /// archive for every request whose result matched, leaving everything
    /// else byte-identical, and serializes it to `path`.
    pub fn export(
        &self,
        path: &Path,
        processed: &[ProcessedRequest],
        update_metadata: bool,
    ) -> Result<()> {
        let mut out = self.root.clone();
        let entries = out
            .pointer_mut("/log/entries")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| CliError::archive("log.entries disappeared during export"))?;

        for item in processed {
            if !item.result.matched {
                continue;
            }
            let Some(entry) = entries.get_mut(item.request.index) else {
                continue;
            };
            rewrite_entry(entry, &item.request, &item.result, update_metadata);
        }

        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::archive(format!("failed to serialize export: {e}")))?;
        std::fs::write(path, text).map_err(|e| CliError::archive(format!("cannot write {}: {e}", path.display())))?;
        Ok(())
    }
}

fn parse_entry(index: usize, entry: &Value) -> Option<RequestData> {
    let request = entry.get("request")?;
    let method = request.get("method")?.as_str()?.to_uppercase();
    let url = request.get("url")?.as_str()?.to_string();

    let path = url
        .split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map(|(_, path)| format!("/{path}"))
        .unwrap_or_else(|| "/".to_string())
        .split(['?', '#'])
        .next()
        .unwrap_or("/")
        .to_string();

    let mut query: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(params) = request.get("queryString").and_then(Value::as_array) {
        for param in params {
            let (Some(name), Some(value)) = (
                param.get("name").and_then(Value::as_str),
                param.get("value").and_then(Value::as_str),
            ) else {
                continue;
            };
            query.entry(name.to_string()).or_default().push(value.to_string());
        }
    }

    let mut headers = Vec::new();
    if let Some(items) = request.get("headers").and_then(Value::as_array) {
        for header in items {
            let (Some(name), Some(value)) = (
                header.get("name").and_then(Value::as_str),
                header.get("value").and_then(Value::as_str),
            ) else {
                continue;
            };
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let (body_text, mime_type) = match request.get("postData") {
        Some(post_data) => (
            post_data.get("text").and_then(Value::as_str).map(str::to_string),
            post_data.get("mimeType").and_then(Value::as_str).map(str::to_string),
        ),
        None => (None, None),
    };

    Some(RequestData {
        index,
        method,
        url,
        path,
        query,
        headers,
        body_text,
        mime_type,
    })
}

fn rewrite_entry(entry: &mut Value, request: &RequestData, result: &MinimizationResult, update_metadata: bool) {
    let Some(entry_obj) = entry.as_object_mut() else {
        return;
    };
    let Some(req_value) = entry_obj.get_mut("request") else {
        return;
    };
    let Some(req_obj) = req_value.as_object_mut() else {
        return;
    };

    let header_array: Vec<Value> = result
        .headers
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    req_obj.insert("headers".to_string(), Value::Array(header_array));

    if let Some(body) = &result.body_text {
        let post_data = req_obj
            .entry("postData".to_string())
            .or_insert_with(|| json!({}));
        if let Some(post_data_obj) = post_data.as_object_mut() {
            post_data_obj.insert("text".to_string(), json!(body));
            post_data_obj
                .entry("mimeType".to_string())
                .or_insert_with(|| json!(request.mime_type.clone().unwrap_or_default()));
        }
    }

    if update_metadata {
        let mut metadata = Map::new();
        metadata.insert("original_header_count".to_string(), json!(request.headers.len()));
        metadata.insert("final_header_count".to_string(), json!(result.headers.len()));
        metadata.insert("header_candidates".to_string(), json!(result.header_candidates));
        metadata.insert("body_candidates".to_string(), json!(result.body_candidates));
        metadata.insert("matched".to_string(), json!(result.matched));
        entry_obj.insert("_minimized".to_string(), Value::Object(metadata));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_har() -> Value {
        json!({
            "log": {
                "version": "1.2",
                "entries": [
                    {
                        "request": {
                            "method": "get",
                            "url": "https://example.com/api/items?id=1",
                            "headers": [{"name": "X-Test", "value": "1"}],
                            "queryString": [{"name": "id", "value": "1"}]
                        }
                    }
                ]
            }
        })
    }

    fn write_temp(contents: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".har").tempfile().unwrap();
        file.write_all(serde_json::to_string(contents).unwrap().as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_method_uppercase_and_query_grouping() {
        let file = write_temp(&sample_har());
        let archive = Archive::load(file.path()).unwrap();
        let requests = archive.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].query.get("id"), Some(&vec!["1".to_string()]));
    }

    #[test]
    fn rejects_archive_without_entries() {
        let file = write_temp(&json!({"log": {}}));
        assert!(Archive::load(file.path()).is_err());
    }
}
