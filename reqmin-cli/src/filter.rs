//! Pre-minimization selection: narrows the archive down to the requests
//! worth replaying before the orchestrator ever sees them.

use std::collections::HashSet;

use regex::Regex;
use reqmin_core::config::{FilterConfig, ScopeConfig};
use reqmin_core::RequestData;

pub struct RequestFilter {
    filter: FilterConfig,
    scope: ScopeConfig,
    url_regex: Vec<Regex>,
    scope_regex: Vec<Regex>,
}

impl RequestFilter {
    pub fn new(filter: FilterConfig, scope: ScopeConfig) -> Self {
        let url_regex = compile_all(&filter.url_regex);
        let scope_regex = compile_all(&scope.include_regex);
        Self {
            filter,
            scope,
            url_regex,
            scope_regex,
        }
    }

    /// Applies the filter gate, the scope gate, and (if configured)
    /// deduplication, in that order, preserving relative order throughout.
    pub fn apply(&self, requests: Vec<RequestData>) -> Vec<RequestData> {
        let gated: Vec<RequestData> = requests
            .into_iter()
            .filter(|r| self.passes_filter_gate(r) && self.passes_scope_gate(r))
            .collect();

        if self.filter.deduplicate_identical {
            dedup(gated)
        } else {
            gated
        }
    }

    fn passes_filter_gate(&self, request: &RequestData) -> bool {
        if !self.filter.methods.is_empty() {
            let method = request.method.to_uppercase();
            if !self.filter.methods.iter().any(|m| m.to_uppercase() == method) {
                return false;
            }
        }

        if !self.filter.hosts.is_empty() {
            let host = request.host();
            if !self.filter.hosts.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
                return false;
            }
        }

        if !self.url_regex.is_empty() && !self.url_regex.iter().any(|re| re.is_match(&request.url)) {
            return false;
        }

        if let Some((start, end)) = self.filter.index_range {
            if request.index < start || request.index > end {
                return false;
            }
        }

        true
    }

    fn passes_scope_gate(&self, request: &RequestData) -> bool {
        if self.scope.include_urls.is_empty() && self.scope.include_regex.is_empty() {
            return true;
        }
        if self.scope.include_urls.iter().any(|u| u == &request.url) {
            return true;
        }
        self.scope_regex.iter().any(|re| re.is_match(&request.url))
    }
}

fn compile_all(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(pattern = p.as_str(), %err, "ignoring unparseable filter regex");
                None
            }
        })
        .collect()
}

fn base_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn normalized_query(request: &RequestData) -> Vec<(String, Vec<String>)> {
    let mut pairs: Vec<(String, Vec<String>)> = request
        .query
        .iter()
        .map(|(name, values)| {
            let mut values = values.clone();
            values.sort();
            (name.clone(), values)
        })
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

fn dedup(requests: Vec<RequestData>) -> Vec<RequestData> {
    let mut seen: HashSet<(String, String, Vec<(String, Vec<String>)>, Option<String>)> = HashSet::new();
    requests
        .into_iter()
        .filter(|r| {
            let key = (
                r.method.to_uppercase(),
                base_url(&r.url).to_string(),
                normalized_query(r),
                r.body_text.clone(),
            );
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(index: usize, method: &str, url: &str) -> RequestData {
        RequestData {
            index,
            method: method.to_string(),
            url: url.to_string(),
            path: "/".to_string(),
            query: HashMap::new(),
            headers: Vec::new(),
            body_text: None,
            mime_type: None,
        }
    }

    #[test]
    fn method_gate_rejects_unlisted_verbs() {
        let filter = RequestFilter::new(
            FilterConfig {
                methods: vec!["GET".to_string()],
                ..Default::default()
            },
            ScopeConfig::default(),
        );
        let requests = vec![request(0, "GET", "https://a.test/x"), request(1, "POST", "https://a.test/y")];
        let kept = filter.apply(requests);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].method, "GET");
    }

    #[test]
    fn scope_gate_defaults_to_unrestricted() {
        let filter = RequestFilter::new(FilterConfig::default(), ScopeConfig::default());
        let requests = vec![request(0, "GET", "https://a.test/x")];
        assert_eq!(filter.apply(requests).len(), 1);
    }

    #[test]
    fn dedup_drops_repeat_method_url_body() {
        let filter = RequestFilter::new(
            FilterConfig {
                deduplicate_identical: true,
                ..Default::default()
            },
            ScopeConfig::default(),
        );
        let requests = vec![
            request(0, "GET", "https://a.test/x"),
            request(1, "GET", "https://a.test/x"),
        ];
        assert_eq!(filter.apply(requests).len(), 1);
    }
}
