// Node control plane
// bitcoind speaks JSON-RPC 1.0 over HTTP with basic auth
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use cusf_core::domain::RpcEndpoint;
use cusf_core::port::{ControlPlane, ControlPlaneError};

const RPC_TIMEOUT: Duration = Duration::from_secs(10);
const RPC_ID: &str = "cusf";

/// Sends `stop` to a node's JSON-RPC endpoint
#[derive(Clone, Default)]
pub struct JsonRpcControlPlane {
    client: Client,
}

impl JsonRpcControlPlane {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlPlane for JsonRpcControlPlane {
    async fn request_stop(&self, endpoint: &RpcEndpoint) -> Result<(), ControlPlaneError> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": RPC_ID,
            "method": "stop",
            "params": [],
        });

        let response = self
            .client
            .post(&endpoint.url)
            .basic_auth(&endpoint.user, Some(&endpoint.password))
            .timeout(RPC_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| ControlPlaneError::Transport(e.to_string()))?;

        let status = response.status();
        // Node RPC errors come back as non-2xx with a JSON body, so read it either way
        let reply: Value = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::Rpc(format!("HTTP {}: {}", status, e)))?;

        match reply.get("error") {
            Some(error) if !error.is_null() => Err(ControlPlaneError::Rpc(error.to_string())),
            _ if !status.is_success() => Err(ControlPlaneError::Rpc(format!("HTTP {}", status))),
            _ => {
                info!(url = %endpoint.url, result = %reply["result"], "Stop requested over RPC");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    // "user:password"
    const EXPECTED_AUTH: &str = "Basic dXNlcjpwYXNzd29yZA==";

    async fn node_rpc(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some(EXPECTED_AUTH);
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(Value::Null));
        }
        if body["method"] != "stop" {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"result": null, "error": {"code": -32601, "message": "Method not found"}, "id": body["id"]})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({"result": "Bitcoin Core stopping", "error": null, "id": body["id"]})),
        )
    }

    fn endpoint(addr: std::net::SocketAddr, password: &str) -> RpcEndpoint {
        RpcEndpoint {
            url: format!("http://{}/", addr),
            user: "user".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stop_accepted() {
        let addr = test_server::spawn(Router::new().route("/", post(node_rpc))).await;

        let result = JsonRpcControlPlane::new()
            .request_stop(&endpoint(addr, "password"))
            .await;

        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let addr = test_server::spawn(Router::new().route("/", post(node_rpc))).await;

        let result = JsonRpcControlPlane::new()
            .request_stop(&endpoint(addr, "wrong"))
            .await;

        assert!(matches!(result, Err(ControlPlaneError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_node_not_listening() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = JsonRpcControlPlane::new()
            .request_stop(&endpoint(addr, "password"))
            .await;

        assert!(matches!(result, Err(ControlPlaneError::Transport(_))));
    }
}
