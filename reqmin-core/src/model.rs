//! Core data types shared by every minimization component.

use std::collections::HashMap;

/// One captured request, as read from the source archive.
///
/// Immutable after construction: nothing in the core ever mutates a
/// `RequestData`, it only derives trial header/body sets from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestData {
    /// Position of this entry in the source archive. Stable, unique, used
    /// to restore original ordering after concurrent processing.
    pub index: usize,
    /// Uppercased HTTP verb.
    pub method: String,
    /// Absolute URL including the query string.
    pub url: String,
    /// Path component of `url`.
    pub path: String,
    /// Query parameters, grouped by name in original order.
    pub query: HashMap<String, Vec<String>>,
    /// Header name/value pairs in original capture order. Names keep their
    /// original casing; case-insensitive matching is done by the caller.
    pub headers: Vec<(String, String)>,
    /// Raw request body, or `None` if the request had no body.
    pub body_text: Option<String>,
    /// Declared `Content-Type`, or `None`.
    pub mime_type: Option<String>,
}

impl RequestData {
    /// Host portion of `url`, stripped of scheme, used by the filter gate.
    pub fn host(&self) -> String {
        self.url
            .split("://")
            .nth(1)
            .unwrap_or(&self.url)
            .split('/')
            .next()
            .unwrap_or("")
            .to_string()
    }
}

/// Result of replaying a request once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSnapshot {
    /// Status code, absent when the request never reached the server.
    pub status_code: Option<u16>,
    /// Response body text, absent on transport failure.
    pub body: Option<String>,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Wall-clock time spent in `client.send`.
    pub elapsed: std::time::Duration,
    /// Transport failure description, absent on protocol success.
    pub error: Option<String>,
}

impl ResponseSnapshot {
    /// True iff the request completed the HTTP protocol without a transport error.
    pub fn ok(&self) -> bool {
        self.status_code.is_some() && self.error.is_none()
    }

    /// Byte length of the response body, 0 when absent.
    pub fn length(&self) -> usize {
        self.body.as_ref().map(|b| b.len()).unwrap_or(0)
    }
}

/// One of the three body shapes the body-reduction phase understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Json,
    Form,
    Raw,
}

/// Outcome of minimizing a single request.
#[derive(Debug, Clone)]
pub struct MinimizationResult {
    /// Final header sequence, a positional subset of the original.
    pub headers: Vec<(String, String)>,
    /// Final body text, or `None` when the original had none.
    pub body_text: Option<String>,
    /// Number of headers that were eligible for removal.
    pub header_candidates: usize,
    /// Number of body fields that were eligible for removal.
    pub body_candidates: usize,
    /// Whether the final (headers, body) pair is still equivalent to baseline.
    pub matched: bool,
    /// Snapshot from the final probe, absent only when the baseline itself failed.
    pub response: Option<ResponseSnapshot>,
}

impl MinimizationResult {
    /// A result representing "no reduction happened", used when the baseline fails.
    pub fn unchanged(request: &RequestData) -> Self {
        Self {
            headers: request.headers.clone(),
            body_text: request.body_text.clone(),
            header_candidates: 0,
            body_candidates: 0,
            matched: false,
            response: None,
        }
    }
}

/// Counts of original/eligible/final items, shared shape for headers and body fields.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct FieldCounts {
    pub original: usize,
    pub candidates: usize,
    pub final_count: usize,
}

/// Per-request summary handed to the report writer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReportEntry {
    pub index: usize,
    pub method: String,
    pub url: String,
    pub path: String,
    pub query: HashMap<String, Vec<String>>,
    pub baseline_status: Option<u16>,
    pub baseline_length: usize,
    pub final_status: Option<u16>,
    pub final_length: usize,
    pub matched: bool,
    pub header_counts: FieldCounts,
    pub body_counts: FieldCounts,
    pub minimized_headers: Vec<(String, String)>,
    pub minimized_body: Option<String>,
    pub error: Option<String>,
}

/// Links a source request to its baseline and minimization outcome, the
/// shape the archive exporter walks over.
#[derive(Debug, Clone)]
pub struct ProcessedRequest {
    pub request: RequestData,
    pub baseline: ResponseSnapshot,
    pub result: MinimizationResult,
}
