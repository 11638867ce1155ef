//! Request-level logging, request IDs, and HTTP metrics.

mod request_ids;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::Instrument as _;
use tracing::{error, info, warn};

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Route label used for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.uri().path() == "/metrics" {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let remote_addr = req.remote_addr().to_string();
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    // The query string is never recorded: redemption URLs carry bearer tokens.
    let span = tracing::info_span!(
        parent: None,
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let duration = started.elapsed();
    let status = request_ids::response_status_or_ok(res.status_code);
    let duration_ms = duration.as_millis();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    metrics::observe_request(
        &method,
        route_label(&path, status),
        status.as_u16(),
        duration.as_secs_f64(),
    );

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        info!(status = status.as_u16(), duration_ms, "request.completed");

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                method = %method,
                path = %path,
                request_id = %request_id,
                "server error response"
            );
        } else if status.is_client_error() {
            warn!(
                status = status.as_u16(),
                method = %method,
                path = %path,
                request_id = %request_id,
                "client error response"
            );
        }

        if duration_ms > threshold_ms {
            warn!(
                method = %method,
                path = %path,
                request_id = %request_id,
                duration_ms,
                threshold_ms,
                "slow request detected"
            );
        }
    });
}

/// Every route is a fixed path, so the path is the route unless nothing matched.
fn route_label(path: &str, status: StatusCode) -> &str {
    if status == StatusCode::NOT_FOUND && !path.starts_with("/api/") {
        UNMATCHED_ROUTE
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };

    use super::*;

    #[handler]
    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("ping").get(ok_handler)),
        )
    }

    #[tokio::test]
    async fn responses_carry_a_generated_request_id() {
        let res = TestClient::get("http://example.com/ping")
            .send(&service())
            .await;

        let request_id = res
            .headers()
            .get(request_ids::REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        assert_eq!(res.status_code, Some(StatusCode::OK), "ping should succeed");
        assert!(
            uuid::Uuid::parse_str(request_id).is_ok(),
            "expected a generated uuid request id, got {request_id:?}"
        );
    }

    #[tokio::test]
    async fn inbound_request_ids_are_echoed() {
        let mut res = TestClient::get("http://example.com/ping")
            .add_header(request_ids::REQUEST_ID_HEADER, "req-123", true)
            .send(&service())
            .await;

        let request_id = res
            .headers()
            .get(request_ids::REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        assert_eq!(request_id.as_deref(), Some("req-123"), "request id should be echoed");
        assert_eq!(
            res.take_string().await.ok().as_deref(),
            Some("ok"),
            "handler body should pass through"
        );
    }

    #[test]
    fn unknown_paths_share_one_route_label() {
        assert_eq!(
            route_label("/wp-login.php", StatusCode::NOT_FOUND),
            UNMATCHED_ROUTE,
            "probe paths must not create new label values"
        );
        assert_eq!(
            route_label("/api/verify-magic-link", StatusCode::NOT_FOUND),
            "/api/verify-magic-link",
            "api 404s keep their route"
        );
        assert_eq!(
            route_label("/healthcheck", StatusCode::OK),
            "/healthcheck",
            "matched paths are their own label"
        );
    }
}
