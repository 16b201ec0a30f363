//! Bounded worker pool that drives every request through the minimizer
//! concurrently, capped by `max_concurrent`, and restores original order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::body::{count_body_fields, resolve_body_kind};
use crate::client::HttpClient;
use crate::comparator::ResponseComparator;
use crate::config::{BodyMinConfig, Config, MinimizationConfig};
use crate::minimizer::RequestMinimizer;
use crate::model::{FieldCounts, ProcessedRequest, ReportEntry, RequestData};

/// Runs the full request set to completion and returns each request
/// bundled with its baseline and minimization outcome, sorted by source
/// index regardless of which worker finished first.
pub struct Orchestrator {
    client: Arc<HttpClient>,
    comparator: Arc<ResponseComparator>,
    minimization: Arc<MinimizationConfig>,
    max_rounds_per_request: u32,
    max_concurrent: usize,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Arc::new(HttpClient::new(&config.client)?);
        let comparator = Arc::new(ResponseComparator::new(config.comparator.clone()));
        Ok(Self {
            client,
            comparator,
            minimization: Arc::new(config.minimization.clone()),
            max_rounds_per_request: config.max_rounds_per_request,
            max_concurrent: config.client.rate_limit.max_concurrent.max(1),
        })
    }

    pub async fn run(&self, requests: Vec<RequestData>) -> Vec<ProcessedRequest> {
        let total = requests.len();
        info!(total, max_concurrent = self.max_concurrent, "starting minimization run");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(total);

        for request in requests {
            let permit_source = Arc::clone(&semaphore);
            let client = Arc::clone(&self.client);
            let comparator = Arc::clone(&self.comparator);
            let minimization = Arc::clone(&self.minimization);
            let max_rounds_per_request = self.max_rounds_per_request;

            let handle = tokio::spawn(async move {
                let _permit = permit_source
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed while workers are outstanding");

                let minimizer = RequestMinimizer::new(&client, &comparator, &minimization, max_rounds_per_request);
                let (baseline, result) = minimizer.minimize(&request).await;
                ProcessedRequest {
                    request,
                    baseline,
                    result,
                }
            });
            handles.push(handle);
        }

        let mut processed = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(entry) => processed.push(entry),
                Err(join_err) => warn!(error = %join_err, "worker task panicked"),
            }
        }

        processed.sort_by_key(|p| p.request.index);
        info!(completed = processed.len(), "minimization run finished");
        processed
    }
}

/// Builds the per-request report summary from a processed request. Kept
/// separate from `ProcessedRequest` itself so archive export can work off
/// the raw baseline/result pair without paying for the report's shape.
///
/// `body_config` resolves the same body kind used during reduction, so the
/// original/final field counts are for the same kind of body rather than
/// independently re-guessed from each text.
pub fn to_report_entry(processed: &ProcessedRequest, body_config: &BodyMinConfig) -> ReportEntry {
    let request = &processed.request;
    let baseline = &processed.baseline;
    let result = &processed.result;
    let original_header_count = request.headers.len();
    let final_header_count = result.headers.len();
    let original_body_candidates = result.body_candidates;

    let body_kind = resolve_body_kind(
        request.mime_type.as_deref(),
        request.body_text.as_deref().unwrap_or(""),
        body_config.body_type,
    );
    let original_body_fields = count_body_fields(body_kind, request.body_text.as_deref());
    let final_body_fields = count_body_fields(body_kind, result.body_text.as_deref());

    ReportEntry {
        index: request.index,
        method: request.method.clone(),
        url: request.url.clone(),
        path: request.path.clone(),
        query: request.query.clone(),
        baseline_status: baseline.status_code,
        baseline_length: baseline.length(),
        final_status: result.response.as_ref().and_then(|r| r.status_code),
        final_length: result.response.as_ref().map(|r| r.length()).unwrap_or(0),
        matched: result.matched,
        header_counts: FieldCounts {
            original: original_header_count,
            candidates: result.header_candidates,
            final_count: final_header_count,
        },
        body_counts: FieldCounts {
            original: original_body_fields,
            candidates: original_body_candidates,
            final_count: final_body_fields,
        },
        minimized_headers: result.headers.clone(),
        minimized_body: result.body_text.clone(),
        error: baseline.error.clone(),
    }
}
