use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Fixed-window request limiter for the webhook route. Telegram retries
/// rejected updates, so shedding load with 429 is safe here.
#[derive(Clone)]
pub struct RateLimiter {
    max_per_window: u32,
    inner: Arc<Mutex<Window>>,
}

struct Window {
    opened_at: Instant,
    seen: u32,
}

impl RateLimiter {
    pub fn per_second(max: u32) -> Self {
        Self {
            max_per_window: max.max(1),
            inner: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                seen: 0,
            })),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut window = self.inner.lock().expect("rate limiter mutex poisoned");
        if window.opened_at.elapsed() >= Duration::from_secs(1) {
            window.opened_at = Instant::now();
            window.seen = 0;
        }
        if window.seen >= self.max_per_window {
            return false;
        }
        window.seen += 1;
        true
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_beyond_the_window_cap_are_rejected() {
        let limiter = RateLimiter::per_second(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
