//! HTTP Handlers
//!
//! Each route is bound to its family or component through a request
//! extension, so one handler serves every `/<op>-<name>` route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use cusf_core::application::{Installer, LauncherContext, StopOutcome, Supervisor, WalletService};
use cusf_core::LauncherError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::types::{
    CheckResponse, FamilyResponse, HealthResponse, ProcessesResponse, ResetResponse,
    StartResponse, StopResponse, WalletResponse,
};

/// Shared services behind every route
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<LauncherContext>,
    pub installer: Arc<Installer>,
    pub supervisor: Arc<Supervisor>,
    pub wallet: Arc<WalletService>,
    /// Directory holding the UI's `index.html`
    pub ui_dir: Option<PathBuf>,
}

/// Family a route is bound to
#[derive(Debug, Clone)]
pub struct FamilyKey(pub String);

/// Component a route is bound to
#[derive(Debug, Clone)]
pub struct ComponentName(pub String);

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    let Some(dir) = state.ui_dir.as_ref() else {
        return (StatusCode::NOT_FOUND, "UI directory not configured").into_response();
    };
    match tokio::fs::read_to_string(dir.join("index.html")).await {
        Ok(body) => Html(body).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: cusf_core::VERSION,
    })
}

/// GET /download-<family>
pub async fn download_family(
    State(state): State<AppState>,
    Extension(FamilyKey(family)): Extension<FamilyKey>,
) -> ApiResult<FamilyResponse> {
    let report = state.installer.download_family(&family).await?;
    Ok(Json(FamilyResponse {
        success: true,
        message: format!(
            "Downloaded {} artifact(s) for {}",
            report.artifacts.len(),
            family
        ),
        path: report.path.display().to_string(),
    }))
}

/// Refuse to touch a family's files while any of its members runs
async fn ensure_family_idle(
    state: &AppState,
    family: &str,
    action: &str,
) -> Result<(), ApiError> {
    if state.supervisor.family_running(family).await? {
        return Err(LauncherError::Conflict(format!(
            "stop every {} component before {} it",
            family, action
        ))
        .into());
    }
    Ok(())
}

/// GET /extract-<family>
pub async fn extract_family(
    State(state): State<AppState>,
    Extension(FamilyKey(family)): Extension<FamilyKey>,
) -> ApiResult<FamilyResponse> {
    ensure_family_idle(&state, &family, "extracting").await?;

    let report = state.installer.extract_family(&family).await?;
    Ok(Json(FamilyResponse {
        success: true,
        message: format!(
            "Extracted {} archive(s) for {}",
            report.artifacts.len(),
            family
        ),
        path: report.path.display().to_string(),
    }))
}

/// DELETE /delete-<family>
pub async fn delete_family(
    State(state): State<AppState>,
    Extension(FamilyKey(family)): Extension<FamilyKey>,
) -> ApiResult<FamilyResponse> {
    ensure_family_idle(&state, &family, "deleting").await?;

    let path = state.installer.delete_family(&family).await?;
    Ok(Json(FamilyResponse {
        success: true,
        message: format!("Deleted {}", family),
        path: path.display().to_string(),
    }))
}

/// GET /start-<component>
pub async fn start_component(
    State(state): State<AppState>,
    Extension(ComponentName(name)): Extension<ComponentName>,
) -> ApiResult<StartResponse> {
    let pid = state.supervisor.start(&name).await?;
    Ok(Json(StartResponse {
        success: true,
        message: format!("{} started", name),
        pid,
    }))
}

/// GET /check-<component>
pub async fn check_component(
    State(state): State<AppState>,
    Extension(ComponentName(name)): Extension<ComponentName>,
) -> ApiResult<CheckResponse> {
    let (exists, path) = state.supervisor.is_installed(&name).await?;
    Ok(Json(CheckResponse {
        success: true,
        exists,
        path: path.display().to_string(),
    }))
}

/// GET|POST /stop-<component>
pub async fn stop_component(
    State(state): State<AppState>,
    Extension(ComponentName(name)): Extension<ComponentName>,
) -> ApiResult<StopResponse> {
    let outcome = state.supervisor.stop(&name).await?;
    let message = match outcome {
        StopOutcome::NotRunning => format!("{} was not running", name),
        StopOutcome::Untracked => format!(
            "{} is running but was not started by this launcher; stop it manually",
            name
        ),
        StopOutcome::Graceful => format!("{} stopped", name),
        StopOutcome::Forced => format!("{} was force killed", name),
    };
    Ok(Json(StopResponse {
        success: true,
        message,
        outcome,
    }))
}

/// POST /reset-folders
pub async fn reset_folders(State(state): State<AppState>) -> ApiResult<ResetResponse> {
    let stopped = state.supervisor.shutdown_all().await;
    info!(stopped = stopped.len(), "Components stopped before reset");

    let removed = state.context.layout.reset().await?;
    Ok(Json(ResetResponse {
        success: true,
        message: format!("Removed {} folder(s)", removed.len()),
        removed: removed.iter().map(|p| p.display().to_string()).collect(),
    }))
}

/// GET /create-wallet
pub async fn create_wallet(State(state): State<AppState>) -> ApiResult<WalletResponse> {
    let output = state.wallet.create_wallet().await?;
    Ok(Json(WalletResponse {
        success: true,
        message: "Wallet created".to_string(),
        output,
    }))
}

/// GET /processes
pub async fn processes(State(state): State<AppState>) -> Json<ProcessesResponse> {
    Json(ProcessesResponse {
        success: true,
        processes: state.supervisor.running(),
    })
}
