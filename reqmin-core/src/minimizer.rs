//! Greedy single-pass reduction of a request's headers and body to the
//! smallest form that still reproduces the baseline response.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::body::{
    enumerate_json_candidates, is_empty_value, parse_form_body, remove_path, resolve_body_kind,
    serialize_form_body, top_level_key, FormField, JsonCandidate,
};
use crate::client::HttpClient;
use crate::comparator::ResponseComparator;
use crate::config::{BodyMinConfig, HeaderMinConfig, MinimizationConfig, ReductionPhase};
use crate::model::{BodyKind, MinimizationResult, RequestData, ResponseSnapshot};

/// Drives baseline replay, both reduction phases in configured order, and
/// the final confirmation probe for one request.
pub struct RequestMinimizer<'a> {
    client: &'a HttpClient,
    comparator: &'a ResponseComparator,
    config: &'a MinimizationConfig,
    max_rounds_per_request: u32,
}

impl<'a> RequestMinimizer<'a> {
    pub fn new(
        client: &'a HttpClient,
        comparator: &'a ResponseComparator,
        config: &'a MinimizationConfig,
        max_rounds_per_request: u32,
    ) -> Self {
        Self {
            client,
            comparator,
            config,
            max_rounds_per_request,
        }
    }

    /// Replays the baseline, reduces, and confirms. Returns the baseline
    /// snapshot alongside the minimization outcome; a failed baseline
    /// short-circuits with an unchanged result, per the documented
    /// failure semantics.
    pub async fn minimize(&self, request: &RequestData) -> (ResponseSnapshot, MinimizationResult) {
        let baseline = self
            .client
            .send(request, &request.headers, request.body_text.as_deref())
            .await;

        if !baseline.ok() {
            return (baseline, MinimizationResult::unchanged(request));
        }

        let mut rounds_used: u32 = 0;
        let mut headers = request.headers.clone();
        let mut body_text = request.body_text.clone();
        let mut header_candidates = 0usize;
        let mut body_candidates = 0usize;

        for phase in &self.config.order {
            match phase {
                ReductionPhase::Headers => {
                    let (reduced, count) = self
                        .reduce_headers(request, &headers, body_text.as_deref(), &baseline, &mut rounds_used)
                        .await;
                    headers = reduced;
                    header_candidates = count;
                }
                ReductionPhase::Body => {
                    let (reduced, count) = self
                        .reduce_body(request, &headers, body_text.clone(), &baseline, &mut rounds_used)
                        .await;
                    body_text = reduced;
                    body_candidates = count;
                }
            }
        }

        let final_response = self.client.send(request, &headers, body_text.as_deref()).await;
        let matched = self.comparator.equivalent(&baseline, &final_response);

        let result = if matched {
            MinimizationResult {
                headers,
                body_text,
                header_candidates,
                body_candidates,
                matched: true,
                response: Some(final_response),
            }
        } else {
            debug!(url = %request.url, "final probe diverged from baseline, reverting");
            MinimizationResult {
                headers: request.headers.clone(),
                body_text: request.body_text.clone(),
                header_candidates,
                body_candidates,
                matched: false,
                response: Some(final_response),
            }
        };

        (baseline, result)
    }

    async fn reduce_headers(
        &self,
        request: &RequestData,
        headers: &[(String, String)],
        body: Option<&str>,
        baseline: &ResponseSnapshot,
        rounds_used: &mut u32,
    ) -> (Vec<(String, String)>, usize) {
        let config: &HeaderMinConfig = &self.config.headers;
        if !config.enabled {
            return (headers.to_vec(), 0);
        }

        let ignore_set: HashSet<String> = config.ignore.iter().map(|s| s.to_lowercase()).collect();
        let protected_set: HashSet<String> = config.protected.iter().map(|s| s.to_lowercase()).collect();
        let candidate_regex: Vec<Regex> = config
            .candidate_regex
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        let working: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| !ignore_set.contains(&name.to_lowercase()))
            .cloned()
            .collect();

        let candidate_indices: Vec<usize> = working
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| {
                let lower = name.to_lowercase();
                if protected_set.contains(&lower) {
                    return false;
                }
                if candidate_regex.is_empty() {
                    return true;
                }
                candidate_regex.iter().any(|re| re.is_match(name))
            })
            .map(|(index, _)| index)
            .collect();

        let header_candidates = candidate_indices.len();
        let mut removed: HashSet<usize> = HashSet::new();

        for index in candidate_indices {
            if *rounds_used >= self.max_rounds_per_request {
                break;
            }
            let trial: Vec<(String, String)> = working
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index && !removed.contains(i))
                .map(|(_, h)| h.clone())
                .collect();

            *rounds_used += 1;
            let response = self.client.send(request, &trial, body).await;
            if self.comparator.equivalent(baseline, &response) {
                removed.insert(index);
            }
        }

        let final_headers: Vec<(String, String)> = working
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, h)| h)
            .collect();

        (final_headers, header_candidates)
    }

    async fn reduce_body(
        &self,
        request: &RequestData,
        headers: &[(String, String)],
        body_text: Option<String>,
        baseline: &ResponseSnapshot,
        rounds_used: &mut u32,
    ) -> (Option<String>, usize) {
        let config: &BodyMinConfig = &self.config.body;
        let Some(original) = body_text else {
            return (None, 0);
        };
        if !config.enabled {
            return (Some(original), 0);
        }

        let kind = resolve_body_kind(request.mime_type.as_deref(), &original, config.body_type);

        match kind {
            BodyKind::Raw => (Some(original), 0),
            BodyKind::Json => {
                self.reduce_json_body(request, headers, &original, baseline, config, rounds_used)
                    .await
            }
            BodyKind::Form => {
                self.reduce_form_body(request, headers, &original, baseline, config, rounds_used)
                    .await
            }
        }
    }

    async fn reduce_json_body(
        &self,
        request: &RequestData,
        headers: &[(String, String)],
        original: &str,
        baseline: &ResponseSnapshot,
        config: &BodyMinConfig,
        rounds_used: &mut u32,
    ) -> (Option<String>, usize) {
        let Ok(parsed) = serde_json::from_str::<Value>(original) else {
            return (Some(original.to_string()), 0);
        };

        let only_keys: HashSet<&str> = config.only_keys.iter().map(String::as_str).collect();
        let protected_keys: HashSet<&str> = config.protected_keys.iter().map(String::as_str).collect();

        let candidates: Vec<JsonCandidate> = enumerate_json_candidates(&parsed)
            .into_iter()
            .filter(|c| {
                let Some(top) = top_level_key(&c.path) else {
                    return false;
                };
                if !only_keys.is_empty() && !only_keys.contains(top.as_str()) {
                    return false;
                }
                if protected_keys.contains(top.as_str()) {
                    return false;
                }
                if config.treat_empty_as_absent && is_empty_value(&parsed, &c.path) {
                    return false;
                }
                true
            })
            .collect();

        let body_candidates = candidates.len();
        let mut accepted: Vec<Vec<crate::body::PathSegment>> = Vec::new();

        for candidate in &candidates {
            if *rounds_used >= self.max_rounds_per_request {
                break;
            }

            let mut trial = parsed.clone();
            for path in accepted.iter().chain(std::iter::once(&candidate.path)) {
                trial = remove_path(&trial, path);
            }
            let Ok(trial_text) = serde_json::to_string(&trial) else {
                continue;
            };

            *rounds_used += 1;
            let response = self.client.send(request, headers, Some(&trial_text)).await;
            if self.comparator.equivalent(baseline, &response) {
                accepted.push(candidate.path.clone());
            }
        }

        let mut final_value = parsed;
        for path in &accepted {
            final_value = remove_path(&final_value, path);
        }
        let final_text = serde_json::to_string(&final_value).unwrap_or_else(|_| original.to_string());
        (Some(final_text), body_candidates)
    }

    async fn reduce_form_body(
        &self,
        request: &RequestData,
        headers: &[(String, String)],
        original: &str,
        baseline: &ResponseSnapshot,
        config: &BodyMinConfig,
        rounds_used: &mut u32,
    ) -> (Option<String>, usize) {
        let fields: Vec<FormField> = parse_form_body(original);
        let only_keys: HashSet<&str> = config.only_keys.iter().map(String::as_str).collect();
        let protected_keys: HashSet<&str> = config.protected_keys.iter().map(String::as_str).collect();

        let candidate_indices: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, field)| {
                if !only_keys.is_empty() && !only_keys.contains(field.name.as_str()) {
                    return false;
                }
                if protected_keys.contains(field.name.as_str()) {
                    return false;
                }
                if config.treat_empty_as_absent && field.value.is_empty() {
                    return false;
                }
                true
            })
            .map(|(index, _)| index)
            .collect();

        let body_candidates = candidate_indices.len();
        let mut removed: HashSet<usize> = HashSet::new();

        for index in candidate_indices {
            if *rounds_used >= self.max_rounds_per_request {
                break;
            }
            let trial_fields: Vec<FormField> = fields
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index && !removed.contains(i))
                .map(|(_, f)| f.clone())
                .collect();
            let trial_text = serialize_form_body(&trial_fields);

            *rounds_used += 1;
            let response = self.client.send(request, headers, Some(&trial_text)).await;
            if self.comparator.equivalent(baseline, &response) {
                removed.insert(index);
            }
        }

        let final_fields: Vec<FormField> = fields
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, f)| f)
            .collect();

        (Some(serialize_form_body(&final_fields)), body_candidates)
    }
}
