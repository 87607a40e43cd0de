//! Governor-based rate limiting middleware.
//!
//! Auth and contact routes each get their own limiter, sized from
//! `rate_limit` in the config and keyed by the client's IP address. The
//! limiter travels to the middleware as a request extension; the peer address
//! comes from `ConnectInfo`, so the server must be started with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

/// A shared per-IP rate limiter.
pub type SharedLimiter = Arc<RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>>;

const FALLBACK_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(n) => n,
    None => unreachable!(),
};

/// Tracked clients before idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Create a per-IP rate limiter with the given requests-per-minute quota.
/// A quota of zero falls back to 60/min.
pub fn create_limiter(requests_per_minute: u32) -> SharedLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(FALLBACK_PER_MINUTE));
    Arc::new(RateLimiter::keyed(quota))
}

/// Client address, or the unspecified address when the connection carries
/// no peer info (in-process requests).
fn client_ip<B>(request: &Request<B>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware. Returns 429 Too Many Requests when exceeded.
pub async fn rate_limit_middleware(
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let limiter = request.extensions().get::<SharedLimiter>().cloned();

    if let Some(limiter) = limiter {
        let ip = client_ip(&request);
        if limiter.check_key(&ip).is_err() {
            tracing::debug!(path = %request.uri().path(), client = %ip, "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(serde_json::json!({
                    "error": "Rate limit exceeded",
                    "code": "rate_limited",
                    "retryable": true,
                })),
            )
                .into_response());
        }
        if limiter.len() > PRUNE_THRESHOLD {
            limiter.retain_recent();
        }
    }

    Ok(next.run(request).await)
}
