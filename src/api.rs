use std::{collections::BTreeMap, sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::{net::TcpListener, time::Instant};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    clients::health::HealthChecker,
    config::Config,
    dispatcher::NotificationDispatcher,
    error::{ErrorKind, NotificationError},
    models::{
        dispatch::DispatchResult,
        notification::{NotificationKind, NotificationRequest},
        response::NotifyResponse,
        template::template_for,
        validation::validate_recipient,
    },
};

pub struct AppState {
    dispatcher: Arc<NotificationDispatcher>,
    health_checker: HealthChecker,
    owner_email: Option<String>,
    request_deadline: Option<Duration>,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<NotificationDispatcher>,
        owner_email: Option<String>,
        request_deadline: Option<Duration>,
    ) -> Self {
        let health_checker = HealthChecker::new(Arc::clone(dispatcher.provider()));
        let owner_email = owner_email.filter(|email| !email.trim().is_empty());

        Self {
            dispatcher,
            health_checker,
            owner_email,
            request_deadline,
        }
    }
}

/// Request body of `POST /api/notifications/{kind}`. Anything beyond the
/// named fields becomes a template parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyPayload {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Result<Router, Error> {
    let cors = cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/notifications/{kind}", post(notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

pub async fn run_api_server(config: Config, dispatcher: Arc<NotificationDispatcher>) -> Result<(), Error> {
    let state = Arc::new(AppState::new(
        dispatcher,
        config.owner_email.clone(),
        config.request_deadline(),
    ));

    let app = build_router(state, &config.allowed_origins)?;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notification server stopped");

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, Error> {
    let origins = allowed_origins
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| anyhow!("Invalid ALLOWED_ORIGINS value '{}': {}", s, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    info!(origins = ?allowed_origins, "CORS configured with allowed origins");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    (health.status.status_code(), Json(health))
}

async fn notify(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    payload: Result<Json<NotifyPayload>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(payload)) => handle_notify(&state, &kind, payload).await,
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            NotifyResponse::error(rejection.body_text(), "Invalid request body".to_string()),
        ),
    };

    (status, Json(body))
}

/// Validates the payload, sends the owner copy (when configured for the
/// kind) and then the member's email. The owner copy is not recalled if the
/// member's email fails afterwards.
pub async fn handle_notify(
    state: &AppState,
    kind: &str,
    payload: NotifyPayload,
) -> (StatusCode, NotifyResponse) {
    let kind: NotificationKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return invalid(e),
    };

    let email = payload.email.unwrap_or_default();
    if email.trim().is_empty() {
        return invalid(NotificationError::InvalidRequest(
            "Email is required".to_string(),
        ));
    }
    if let Err(e) = validate_recipient(&email) {
        return invalid(e);
    }

    let request = NotificationRequest::new(kind, email.trim())
        .with_first_name(payload.first_name.unwrap_or_default())
        .with_last_name(payload.last_name.unwrap_or_default())
        .with_params(payload.params);

    let deadline = state.request_deadline.map(|d| Instant::now() + d);

    let owner = state
        .owner_email
        .as_deref()
        .filter(|owner| template_for(kind).notify_owner && !owner.eq_ignore_ascii_case(request.recipient()));

    if let Some(owner) = owner {
        let owner_result = dispatch_before(state, &request.owner_copy(owner), deadline).await;
        if !owner_result.is_success() {
            warn!(kind = %kind, "Owner copy failed, member email not sent");
            return failure(owner_result);
        }
    }

    let result = dispatch_before(state, &request, deadline).await;

    if result.is_success() {
        (
            StatusCode::OK,
            NotifyResponse::success(result.message_id, result.attempts),
        )
    } else {
        failure(result)
    }
}

async fn dispatch_before(
    state: &AppState,
    request: &NotificationRequest,
    deadline: Option<Instant>,
) -> DispatchResult {
    match deadline {
        Some(deadline) => {
            state
                .dispatcher
                .dispatch_with_cancel(request, tokio::time::sleep_until(deadline))
                .await
        }
        None => state.dispatcher.dispatch(request).await,
    }
}

fn invalid(error: NotificationError) -> (StatusCode, NotifyResponse) {
    (
        StatusCode::BAD_REQUEST,
        NotifyResponse::error(error.to_string(), "Invalid request".to_string()),
    )
}

fn failure(result: DispatchResult) -> (StatusCode, NotifyResponse) {
    let status = match result.error_kind() {
        Some(ErrorKind::InvalidRequest) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let error = result
        .error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "Unknown error".to_string());

    (
        status,
        NotifyResponse::error(error, "Failed to send email".to_string()).with_attempts(result.attempts),
    )
}
