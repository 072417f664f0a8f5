//! Average calculator REST API
//!
//! - GET /                   - Welcome banner
//! - GET /health             - Liveness plus window occupancy
//! - GET /numbers/{numberid} - Fetch a batch for `p`, `f`, `e` or `r`, fold it
//!   into the window and report both snapshots with the rounded average

#![forbid(unsafe_code)]

use crate::errors::FetchError;
use crate::upstream::NumberSource;
use avgcalc_core::{average, round_for_display, Number, NumberKind, UnknownKind, WindowStore};
use axum::{
    extract::{Path, State},
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Successful `/numbers` response (JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumbersResponse {
    pub window_prev_state: Vec<Number>,
    pub window_curr_state: Vec<Number>,
    pub numbers: Vec<Number>,
    pub avg: f64,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub window_len: usize,
    pub capacity: usize,
}

/// API error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self { success: false, error: error.into(), code: code.to_string(), status }
    }
}

impl From<UnknownKind> for ErrorResponse {
    fn from(e: UnknownKind) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_NUMBER_TYPE", e.to_string())
    }
}

impl From<FetchError> for ErrorResponse {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "Request timeout - External service took too long to respond",
            ),
            FetchError::Unauthorized => Self::new(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized - Invalid or expired token",
            ),
            FetchError::Status(code) => {
                let status = StatusCode::from_u16(code)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Self::new(status, "UPSTREAM_ERROR", format!("External API error: status {code}"))
            }
            FetchError::InvalidPayload(msg) => Self::new(
                StatusCode::BAD_GATEWAY,
                "INVALID_PAYLOAD",
                format!("Invalid response format from external API: {msg}"),
            ),
            FetchError::Transport(msg) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!("Internal server error: {msg}"),
            ),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// App state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub window: Arc<WindowStore>,
    pub source: Arc<dyn NumberSource>,
}

/// Creates the numbers API router
pub fn create_numbers_router(window: Arc<WindowStore>, source: Arc<dyn NumberSource>) -> Router {
    let state = ApiState { window, source };

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/numbers/{numberid}", get(get_numbers))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

async fn welcome() -> &'static str {
    "Welcome to the Average Calculator API"
}

/// GET /health
async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        timestamp: chrono::Utc::now(),
        window_len: state.window.len(),
        capacity: state.window.capacity(),
    })
}

/// GET /numbers/{numberid}
///
/// The window is only updated once the upstream batch has been fetched and
/// validated; every failure path leaves it untouched.
async fn get_numbers(
    State(state): State<ApiState>,
    Path(numberid): Path<String>,
) -> Result<Json<NumbersResponse>, ErrorResponse> {
    info!("GET /numbers/{}", numberid);

    let kind: NumberKind = numberid.parse()?;
    let numbers = state.source.fetch(kind).await.map_err(|e| {
        warn!(%kind, error = %e, "upstream fetch failed");
        ErrorResponse::from(e)
    })?;

    let update = state.window.update(&numbers);
    let avg = round_for_display(average(&update.current));

    Ok(Json(NumbersResponse {
        window_prev_state: update.previous,
        window_curr_state: update.current,
        numbers,
        avg,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tower::ServiceExt; // For oneshot()

    /// Replays canned outcomes in order.
    struct ScriptedSource {
        outcomes: Mutex<VecDeque<Result<Vec<Number>, FetchError>>>,
        seen: Mutex<Vec<NumberKind>>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<Result<Vec<i32>, FetchError>>) -> Arc<Self> {
            let outcomes = outcomes
                .into_iter()
                .map(|r| r.map(|v| v.into_iter().map(Number::from).collect()))
                .collect();
            Arc::new(Self { outcomes: Mutex::new(outcomes), seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl NumberSource for ScriptedSource {
        async fn fetch(&self, kind: NumberKind) -> Result<Vec<Number>, FetchError> {
            self.seen.lock().unwrap().push(kind);
            self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    fn nums(v: &[i32]) -> Vec<Number> {
        v.iter().copied().map(Number::from).collect()
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_window_scenario_over_http() {
        let source = ScriptedSource::new(vec![Ok(vec![1, 2, 3]), Ok(vec![4]), Ok(vec![2, 2, 5])]);
        let window = Arc::new(WindowStore::new(3));
        let app = create_numbers_router(window.clone(), source.clone());

        let (status, body) = get(&app, "/numbers/p").await;
        assert_eq!(status, StatusCode::OK);
        let r: NumbersResponse = serde_json::from_value(body).unwrap();
        assert!(r.window_prev_state.is_empty());
        assert_eq!(r.window_curr_state, nums(&[1, 2, 3]));
        assert_eq!(r.avg, 2.0);

        let (_, body) = get(&app, "/numbers/f").await;
        let r: NumbersResponse = serde_json::from_value(body).unwrap();
        assert_eq!(r.window_prev_state, nums(&[1, 2, 3]));
        assert_eq!(r.window_curr_state, nums(&[2, 3, 4]));
        assert_eq!(r.avg, 3.0);

        let (_, body) = get(&app, "/numbers/E").await;
        assert_eq!(body["windowPrevState"], serde_json::json!([2, 3, 4]));
        assert_eq!(body["windowCurrState"], serde_json::json!([3, 4, 5]));
        assert_eq!(body["numbers"], serde_json::json!([2, 2, 5]));
        assert_eq!(body["avg"], serde_json::json!(4.0));

        assert_eq!(
            *source.seen.lock().unwrap(),
            vec![NumberKind::Prime, NumberKind::Fibonacci, NumberKind::Even]
        );
    }

    #[tokio::test]
    async fn test_average_is_rounded() {
        let source = ScriptedSource::new(vec![Ok(vec![1, 2, 2])]);
        let app = create_numbers_router(Arc::new(WindowStore::new(10)), source);

        let (_, body) = get(&app, "/numbers/r").await;
        assert_eq!(body["avg"], serde_json::json!(1.67));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_request() {
        let source = ScriptedSource::new(vec![]);
        let app = create_numbers_router(Arc::new(WindowStore::new(10)), source.clone());

        let (status, body) = get(&app, "/numbers/x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_NUMBER_TYPE");
        assert!(source.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_errors_map_to_distinct_statuses() {
        let cases = [
            (FetchError::Timeout, StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            (FetchError::Unauthorized, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (FetchError::Status(503), StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_ERROR"),
            (FetchError::Status(302), StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            (FetchError::invalid_payload("x"), StatusCode::BAD_GATEWAY, "INVALID_PAYLOAD"),
            (FetchError::transport("refused"), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            let window = Arc::new(WindowStore::new(3));
            window.update(&nums(&[7]));
            let app = create_numbers_router(window.clone(), ScriptedSource::new(vec![Err(err)]));

            let (got, body) = get(&app, "/numbers/p").await;
            assert_eq!(got, status);
            assert_eq!(body["code"], code);
            assert_eq!(window.snapshot(), nums(&[7]), "window changed on {code}");
        }
    }

    #[tokio::test]
    async fn test_health_and_welcome() {
        let window = Arc::new(WindowStore::new(4));
        window.update(&nums(&[1, 2]));
        let app = create_numbers_router(window, ScriptedSource::new(vec![]));

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["window_len"], 2);
        assert_eq!(body["capacity"], 4);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Welcome to the Average Calculator API");
    }
}
