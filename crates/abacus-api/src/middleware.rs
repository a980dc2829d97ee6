//! Request middleware
//!
//! Request and correlation ids, a token bucket rate limiter and a request
//! monitor that logs latency. CORS, body limits and timeouts come from
//! `tower-http` and are assembled in [`crate::create_app_with_config`].

use crate::config::SecurityConfig;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

/// Identifiers attached to every request as an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIds {
    pub request_id: String,
    pub correlation_id: String,
}

impl RequestIds {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            request_id: header_or_new(headers, &REQUEST_ID_HEADER),
            correlation_id: header_or_new(headers, &CORRELATION_ID_HEADER),
        }
    }
}

fn header_or_new(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Assign request and correlation ids and run the request inside a span
///
/// Incoming ids are reused; missing ones are generated. Both are echoed on
/// the response.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let ids = RequestIds::from_headers(request.headers());
    request.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %ids.request_id,
        correlation_id = %ids.correlation_id,
    );

    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&ids.request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&ids.correlation_id) {
        headers.insert(CORRELATION_ID_HEADER, value);
    }

    response
}

/// Log method, path, status and latency of every request
pub async fn monitor_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let correlation_id = request
        .extensions()
        .get::<RequestIds>()
        .map(|ids| ids.correlation_id.clone())
        .unwrap_or_else(|| "N/A".to_string());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        query = %query,
        status = status.as_u16(),
        latency_ms = duration.as_secs_f64() * 1000.0,
        correlation_id = %correlation_id,
        "Request completed"
    );

    if duration > SLOW_REQUEST_THRESHOLD {
        warn!(
            method = %method,
            path = %path,
            duration_ms = duration.as_millis(),
            "Slow request detected"
        );
    }

    response
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Process-wide token bucket rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    rate_per_second: f64,
    capacity: f64,
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// `requests_per_second` tokens are refilled per second, up to `burst`
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            rate_per_second: f64::from(requests_per_second),
            capacity,
            bucket: Arc::new(Mutex::new(TokenBucket { tokens: capacity, last_refill: Instant::now() })),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.requests_per_second, config.burst)
    }

    /// Take one token if available
    pub async fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_second).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until the next token is available, rounded up
    fn retry_after_seconds(&self) -> u64 {
        if self.rate_per_second > 0.0 { (1.0 / self.rate_per_second).ceil().max(1.0) as u64 } else { 60 }
    }
}

/// Reject requests once the bucket is empty
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    if !limiter.try_acquire().await {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        return ApiError::RateLimited { retry_after_seconds: limiter.retry_after_seconds() }
            .into_response();
    }

    debug!("Request allowed by rate limiter");
    next.run(request).await
}

/// Build the CORS layer from the allowed origins
///
/// `*` allows any origin; unparsable origins are skipped with a warning.
pub fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([REQUEST_ID_HEADER, CORRELATION_ID_HEADER])
}
