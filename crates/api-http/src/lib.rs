//! HTTP API Layer
//!
//! Local control surface for the launcher: one route per lifecycle operation
//! per component or family, each a thin adapter into the core services.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use handler::AppState;
pub use server::{router, HttpServer, HttpServerConfig};
