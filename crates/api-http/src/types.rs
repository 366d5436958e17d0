//! HTTP Response Types
//!
//! Every body carries `success`; failures use [`ErrorResponse`].

use cusf_core::application::{RunningProcess, StopOutcome};
use serde::Serialize;

/// GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// download-, extract- and delete-<family>
#[derive(Debug, Clone, Serialize)]
pub struct FamilyResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
}

/// start-<component>
#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    pub pid: u32,
}

/// check-<component>
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub exists: bool,
    pub path: String,
}

/// stop-<component>
#[derive(Debug, Clone, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: String,
    pub outcome: StopOutcome,
}

/// POST /reset-folders
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub removed: Vec<String>,
}

/// GET /create-wallet
#[derive(Debug, Clone, Serialize)]
pub struct WalletResponse {
    pub success: bool,
    pub message: String,
    pub output: String,
}

/// GET /processes
#[derive(Debug, Clone, Serialize)]
pub struct ProcessesResponse {
    pub success: bool,
    pub processes: Vec<RunningProcess>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
