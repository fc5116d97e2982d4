//! Metrics middleware for API routes.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let _in_flight = InFlight;

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Decrements the in-flight gauge even when the client disconnects mid-request.
struct InFlight;

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}
