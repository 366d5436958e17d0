// Control Plane Port
// Cooperative stop requests sent before any signal

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RpcEndpoint;

#[derive(Error, Debug)]
pub enum ControlPlaneError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Control Plane trait
///
/// Implementations:
/// - JsonRpcControlPlane: JSON-RPC 1.0 `stop` over plaintext HTTP with basic auth
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Ask the component behind `endpoint` to shut itself down
    async fn request_stop(&self, endpoint: &RpcEndpoint) -> Result<(), ControlPlaneError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::process::mocks::EventLog;

    /// Records `rpc-stop:<url>` into a shared event log
    pub struct RecordingControlPlane {
        events: EventLog,
        fail: bool,
    }

    impl RecordingControlPlane {
        pub fn new(events: EventLog) -> Self {
            Self {
                events,
                fail: false,
            }
        }

        pub fn unreachable(events: EventLog) -> Self {
            Self { events, fail: true }
        }
    }

    #[async_trait]
    impl ControlPlane for RecordingControlPlane {
        async fn request_stop(&self, endpoint: &RpcEndpoint) -> Result<(), ControlPlaneError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("rpc-stop:{}", endpoint.url));
            if self.fail {
                return Err(ControlPlaneError::Transport("connection refused".to_string()));
            }
            Ok(())
        }
    }
}
