//! Decides whether a trial response is "close enough" to the baseline to
//! treat the probed header/body change as safe.

use regex::Regex;

use crate::config::{ComparatorConfig, ComparatorLogic};
use crate::model::ResponseSnapshot;

/// Stateless comparator: holds compiled regexes so they aren't rebuilt per probe.
pub struct ResponseComparator {
    config: ComparatorConfig,
    compiled_regex: Vec<Regex>,
}

impl ResponseComparator {
    pub fn new(config: ComparatorConfig) -> Self {
        let compiled_regex = config
            .regex
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!(pattern, %err, "ignoring unparseable comparator regex");
                    None
                }
            })
            .collect();
        Self {
            config,
            compiled_regex,
        }
    }

    /// True iff `candidate` is an acceptable stand-in for `baseline` under
    /// every configured rule. Short-circuits on the first failing rule.
    pub fn equivalent(&self, baseline: &ResponseSnapshot, candidate: &ResponseSnapshot) -> bool {
        if !candidate.ok() {
            return false;
        }

        if self.config.status_code && baseline.status_code != candidate.status_code {
            return false;
        }

        if self.config.length_check {
            let baseline_len = baseline.length() as f64;
            let candidate_len = candidate.length() as f64;
            let tolerance = self.config.length_tolerance * baseline_len;
            if (candidate_len - baseline_len).abs() > tolerance {
                return false;
            }
        }

        let body = candidate.body.as_deref().unwrap_or("");

        if !self.config.need_all.is_empty() && !self.config.need_all.iter().all(|s| body.contains(s.as_str())) {
            return false;
        }

        if !self.config.need_any.is_empty() && !self.config.need_any.iter().any(|s| body.contains(s.as_str())) {
            return false;
        }

        if !self.compiled_regex.is_empty() {
            let matches_regex = match self.config.logic {
                ComparatorLogic::And => self.compiled_regex.iter().all(|re| re.is_match(body)),
                ComparatorLogic::Or => self.compiled_regex.iter().any(|re| re.is_match(body)),
            };
            if !matches_regex {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot(status: u16, body: &str) -> ResponseSnapshot {
        ResponseSnapshot {
            status_code: Some(status),
            body: Some(body.to_string()),
            headers: HashMap::new(),
            elapsed: std::time::Duration::default(),
            error: None,
        }
    }

    #[test]
    fn default_config_only_checks_status() {
        let comparator = ResponseComparator::new(ComparatorConfig::default());
        let baseline = snapshot(200, "hello world");
        let candidate = snapshot(200, "completely different body");
        assert!(comparator.equivalent(&baseline, &candidate));
    }

    #[test]
    fn status_mismatch_rejected() {
        let comparator = ResponseComparator::new(ComparatorConfig::default());
        let baseline = snapshot(200, "ok");
        let candidate = snapshot(500, "ok");
        assert!(!comparator.equivalent(&baseline, &candidate));
    }

    #[test]
    fn transport_failure_never_equivalent() {
        let comparator = ResponseComparator::new(ComparatorConfig::default());
        let baseline = snapshot(200, "ok");
        let mut candidate = snapshot(200, "ok");
        candidate.error = Some("connection reset".to_string());
        assert!(!comparator.equivalent(&baseline, &candidate));
    }

    #[test]
    fn length_check_respects_tolerance() {
        let mut config = ComparatorConfig::default();
        config.length_check = true;
        config.length_tolerance = 0.1;
        let comparator = ResponseComparator::new(config);
        let baseline = snapshot(200, &"x".repeat(100));
        let close = snapshot(200, &"x".repeat(105));
        let far = snapshot(200, &"x".repeat(200));
        assert!(comparator.equivalent(&baseline, &close));
        assert!(!comparator.equivalent(&baseline, &far));
    }

    #[test]
    fn need_all_requires_every_substring() {
        let mut config = ComparatorConfig::default();
        config.need_all = vec!["token".to_string(), "ok".to_string()];
        let comparator = ResponseComparator::new(config);
        let baseline = snapshot(200, "token=abc ok");
        let missing = snapshot(200, "token=abc");
        let present = snapshot(200, "token=xyz ok");
        assert!(!comparator.equivalent(&baseline, &missing));
        assert!(comparator.equivalent(&baseline, &present));
    }

    #[test]
    fn regex_logic_or_accepts_single_match() {
        let mut config = ComparatorConfig::default();
        config.logic = ComparatorLogic::Or;
        config.regex = vec!["^no-match-here$".to_string(), r"\bok\b".to_string()];
        let comparator = ResponseComparator::new(config);
        let baseline = snapshot(200, "ok");
        let candidate = snapshot(200, "status ok");
        assert!(comparator.equivalent(&baseline, &candidate));
    }
}
