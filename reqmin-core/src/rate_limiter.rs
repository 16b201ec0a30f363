//! Token-bucket throttle shared by every worker in the pool.

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

struct Bucket {
    allowance: f64,
    last_check: Instant,
}

/// Caps outbound request rate at `rps` requests/second across all callers.
///
/// A `None` rate means unlimited: `wait` returns immediately without taking
/// the lock. Every worker task holds a clone of the same limiter via `Arc`.
pub struct RateLimiter {
    rps: Option<f64>,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(requests_per_second: Option<f64>) -> Self {
        Self {
            rps: requests_per_second,
            bucket: Mutex::new(Bucket {
                allowance: 0.0,
                last_check: Instant::now(),
            }),
        }
    }

    /// Blocks the caller until it is this request's turn, then debits one
    /// token. Mirrors a classic allowance-refill limiter: the bucket fills
    /// at `rps` tokens/second up to a ceiling of `rps`, and a caller that
    /// arrives with less than one token sleeps for the shortfall.
    pub async fn wait(&self) {
        let Some(rps) = self.rps else {
            return;
        };
        if rps <= 0.0 {
            return;
        }

        let sleep_for = {
            let mut bucket = self.bucket.lock().await;
            let now = Instant::now();
            let elapsed = now.duration_since(bucket.last_check).as_secs_f64();
            bucket.last_check = now;
            bucket.allowance += elapsed * rps;
            if bucket.allowance > rps {
                bucket.allowance = rps;
            }

            if bucket.allowance < 1.0 {
                let wait_secs = (1.0 - bucket.allowance) / rps;
                bucket.allowance = 0.0;
                Some(wait_secs.max(0.0))
            } else {
                bucket.allowance -= 1.0;
                None
            }
        };

        if let Some(secs) = sleep_for {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}
