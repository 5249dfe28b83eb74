//! Fixed-window request limiter for the `/api` routes.
//!
//! Clients are keyed by peer IP (`ConnectInfo`); requests without connection info
//! share one bucket. A window opens on a client's first request and resets
//! `window` later. Expired windows are pruned once the table grows past
//! `PRUNE_THRESHOLD`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use tracing::warn;

use crate::errors::AppError;

const PRUNE_THRESHOLD: usize = 10_000;
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Counts one request. `Err` carries the whole seconds until the window resets.
    pub fn check(&self, client: &str, now: Instant) -> Result<(), u64> {
        if self.max_requests == 0 {
            return Ok(());
        }

        let mut clients = self.clients.lock();
        if clients.len() > PRUNE_THRESHOLD {
            clients.retain(|_, w| w.resets_at > now);
        }

        match clients.get_mut(client) {
            Some(w) if now < w.resets_at => {
                if w.count >= self.max_requests {
                    let remaining = w.resets_at - now;
                    return Err(remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0));
                }
                w.count += 1;
            }
            _ => {
                clients.insert(
                    client.to_string(),
                    Window {
                        count: 1,
                        resets_at: now + self.window,
                    },
                );
            }
        }
        Ok(())
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), |info| info.0.ip().to_string());

    if let Err(retry_after_secs) = limiter.check(&client, Instant::now()) {
        warn!(client = %client, path = %request.uri().path(), retry_after_secs, "Rate limit exceeded");
        return Err(AppError::RateLimited { retry_after_secs });
    }
    Ok(next.run(request).await)
}
