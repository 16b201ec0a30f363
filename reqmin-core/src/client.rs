//! Thin reqwest wrapper: replays one request exactly as instructed and
//! turns whatever comes back (or doesn't) into a `ResponseSnapshot`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::model::{RequestData, ResponseSnapshot};
use crate::rate_limiter::RateLimiter;

/// Replays requests through a shared connection pool, throttled by a
/// shared `RateLimiter`. Cheap to clone: the inner `reqwest::Client` and
/// limiter are both reference-counted internally / via `Arc`.
pub struct HttpClient {
    inner: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout))
            .danger_accept_invalid_certs(!config.verify_tls);

        for (scheme, proxy_url) in &config.proxies {
            if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            } else {
                warn!(scheme, proxy_url, "ignoring unparseable proxy URL");
            }
        }

        let inner = builder.build()?;
        let rate_limiter = RateLimiter::new(config.rate_limit.requests_per_second);
        Ok(Self {
            inner,
            rate_limiter,
        })
    }

    /// Sends `request` with `headers` substituted for the originals and
    /// `body` overriding `request.body_text` when present (falling back to
    /// it when absent), waiting on the rate limiter first. Never returns
    /// `Err`: transport failures are folded into `ResponseSnapshot::error`
    /// so the minimizer can treat "server said no" and "never got there"
    /// alike.
    pub async fn send(
        &self,
        request: &RequestData,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> ResponseSnapshot {
        self.rate_limiter.wait().await;

        let method = Method::from_bytes(request.method.as_bytes()).unwrap_or(Method::GET);
        let mut builder = self.inner.request(method, &request.url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(b) = body.or(request.body_text.as_deref()) {
            builder = builder.body(b.to_string());
        }

        let start = std::time::Instant::now();
        match builder.send().await {
            Ok(resp) => {
                let status_code = resp.status().as_u16();
                let mut header_map = HashMap::new();
                for (k, v) in resp.headers() {
                    header_map.insert(k.as_str().to_string(), v.to_str().unwrap_or("").to_string());
                }
                let body_text = resp.text().await.unwrap_or_default();
                debug!(status_code, url = %request.url, "replayed request");
                ResponseSnapshot {
                    status_code: Some(status_code),
                    body: Some(body_text),
                    headers: header_map,
                    elapsed: start.elapsed(),
                    error: None,
                }
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "replay failed");
                ResponseSnapshot {
                    status_code: None,
                    body: None,
                    headers: HashMap::new(),
                    elapsed: start.elapsed(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
