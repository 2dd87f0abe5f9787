//! Request logging middleware.
//!
//! Every request gets an `x-request-id`, a server span named after its
//! normalised route, a Prometheus observation and one completion log line.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

#[derive(Debug)]
struct Completion<'a> {
    method: &'a str,
    path: &'a str,
    request_id: &'a str,
    status: StatusCode,
    elapsed: Duration,
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    // Scrapes would drown out real traffic.
    if req.uri().path() == "/metrics" {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let settings = settings::request_settings();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = spans::request_span_name(&method, &path);
    let _in_flight = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %route.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings.parent_propagation {
        adopt_parent(&span, req);
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let completion = Completion {
        method: &method,
        path: &path,
        request_id: &request_id,
        status: request_ids::response_status_or_ok(res.status_code),
        elapsed: started.elapsed(),
    };

    metrics::observe_request(
        &method,
        &route.otel_path,
        completion.status.as_u16(),
        completion.elapsed.as_secs_f64(),
    );

    span.record("status", completion.status.as_u16());
    span.record("duration_ms", completion.elapsed.as_millis());

    span.in_scope(|| log_completion(&completion, settings.slow_request_threshold));
}

fn adopt_parent(span: &Span, req: &Request) {
    let Some(parent) = parent_context::extract_parent_context(req.headers()) else {
        return;
    };

    if let Err(source) = span.set_parent(parent) {
        warn!("failed to set parent context on request span: {source}");
    }
}

fn log_completion(completion: &Completion<'_>, slow_threshold: Duration) {
    let Completion {
        method,
        path,
        request_id,
        status,
        elapsed,
    } = completion;

    let status = status.as_u16();
    let duration_ms = elapsed.as_millis();

    info!(status, duration_ms, "request.completed");

    if completion.status.is_server_error() {
        error!(status, method, path, request_id, "server error response");
    } else if completion.status.is_client_error() {
        warn!(status, method, path, request_id, "client error response");
    }

    if *elapsed > slow_threshold {
        warn!(
            method,
            path,
            request_id,
            duration_ms,
            threshold_ms = slow_threshold.as_millis(),
            "slow request detected"
        );
    }
}
