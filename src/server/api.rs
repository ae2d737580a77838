//! REST endpoints
//!
//! analyze → generate-tests → execute-tests, plus artifact downloads. Every
//! failure answers with a JSON `{"error": ...}` body.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ai::{ProviderError, ProviderManager};
use crate::analyzer::AppAnalyzer;
use crate::driver::http::HttpProbe;
use crate::driver::traits::SessionLauncher;
use crate::parser::cases::parse_test_cases;
use crate::runner::executor::TestExecutor;
use crate::utils::config::Config;
use crate::utils::session::{Artifact, SessionStore};

/// Shared state for API handlers
pub struct AppState {
    pub config: Config,
    pub store: SessionStore,
    pub providers: ProviderManager,
    pub launcher: Arc<dyn SessionLauncher>,
    pub http: Arc<dyn HttpProbe>,
}

impl AppState {
    fn analyzer(&self) -> AppAnalyzer {
        AppAnalyzer::new(
            self.launcher.clone(),
            self.http.clone(),
            self.config.browser.clone(),
        )
    }

    fn executor(&self) -> TestExecutor {
        TestExecutor::new(
            self.launcher.clone(),
            self.http.clone(),
            self.config.browser.clone(),
        )
    }
}

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", err))
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unknown(_) => Self::bad_request(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub template: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub test_cases: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/generate-tests", post(generate_tests))
        .route("/providers", get(providers))
        .route("/execute-tests", post(execute_tests))
        .route("/download-tests/:session_id", get(download_tests))
        .route("/download-execution/:session_id", get(download_execution))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Reject ids the store would refuse before doing any expensive work
fn checked_session(store: &SessionStore, session_id: &str) -> Result<(), ApiError> {
    store
        .session_dir(session_id)
        .map(|_| ())
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult {
    let url = non_empty(request.url).ok_or_else(|| ApiError::bad_request("URL is required"))?;

    let context = state.analyzer().analyze(&url).await?;
    Ok(Json(json!({
        "success": true,
        "context": context,
        "session_id": SessionStore::new_session_id(),
    })))
}

async fn generate_tests(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult {
    let (Some(context), Some(session_id)) =
        (non_empty(request.context), non_empty(request.session_id))
    else {
        return Err(ApiError::bad_request("Context and session ID are required"));
    };
    checked_session(&state.store, &session_id)?;

    let (test_cases, provider_used) = state
        .providers
        .generate_test_cases(
            &context,
            request.provider.as_deref(),
            request.template.as_ref(),
        )
        .await?;
    state.store.save_test_cases(&session_id, &test_cases)?;

    Ok(Json(json!({
        "success": true,
        "test_cases": test_cases,
        "download_url": format!("/download-tests/{}", session_id),
        "provider_used": provider_used,
    })))
}

async fn providers(State(state): State<Arc<AppState>>) -> ApiResult {
    Ok(Json(json!({
        "success": true,
        "providers": state.providers.available_providers(),
    })))
}

async fn execute_tests(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> ApiResult {
    let missing = || ApiError::bad_request("Test cases, URL, and session ID are required");
    let document = request
        .test_cases
        .filter(|v| !v.is_null())
        .ok_or_else(missing)?;
    let url = non_empty(request.url).ok_or_else(missing)?;
    let session_id = non_empty(request.session_id).ok_or_else(missing)?;
    checked_session(&state.store, &session_id)?;

    let test_cases =
        parse_test_cases(&document).map_err(|e| ApiError::bad_request(e.to_string()))?;
    if test_cases.is_empty() {
        return Err(missing());
    }

    let report = state
        .executor()
        .execute_top_tests(&test_cases, &url, state.config.execution_limit)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    state.store.save_execution(&session_id, &report)?;

    Ok(Json(json!({
        "success": true,
        "execution_results": report,
        "download_url": format!("/download-execution/{}", session_id),
    })))
}

async fn download_tests(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    download(&state.store, &session_id, Artifact::TestCases)
}

async fn download_execution(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    download(&state.store, &session_id, Artifact::Execution)
}

fn download(store: &SessionStore, session_id: &str, artifact: Artifact) -> Result<Response, ApiError> {
    let bytes = store
        .read_artifact(session_id, artifact)
        .map_err(|e| ApiError::not_found(e.to_string()))?
        .ok_or_else(|| ApiError::not_found(format!("No {} for session {}", artifact.file_name(), session_id)))?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
