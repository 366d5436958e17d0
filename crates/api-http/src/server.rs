//! HTTP Server
//!
//! Routes are generated from the component registry: one set per family and
//! one per component, bound to localhost only.

use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handler::{self, AppState, ComponentName, FamilyKey};

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 3000;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Build the full control-surface router
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health))
        .route("/processes", get(handler::processes))
        .route("/reset-folders", post(handler::reset_folders))
        .route("/create-wallet", get(handler::create_wallet));

    for family in state.context.registry.families() {
        let key = FamilyKey(family.key.clone());
        router = router
            .route(
                &format!("/download-{}", family.key),
                get(handler::download_family).layer(Extension(key.clone())),
            )
            .route(
                &format!("/extract-{}", family.key),
                get(handler::extract_family).layer(Extension(key.clone())),
            )
            .route(
                &format!("/delete-{}", family.key),
                delete(handler::delete_family).layer(Extension(key)),
            );
    }

    for component in state.context.registry.components() {
        let name = ComponentName(component.id.as_str().to_string());
        router = router.route(
            &format!("/check-{}", component.id),
            get(handler::check_component).layer(Extension(name.clone())),
        );

        if component.launchable {
            router = router
                .route(
                    &format!("/start-{}", component.id),
                    get(handler::start_component).layer(Extension(name.clone())),
                )
                .route(
                    &format!("/stop-{}", component.id),
                    get(handler::stop_component)
                        .post(handler::stop_component)
                        .layer(Extension(name)),
                );
        }
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until `shutdown` resolves
    ///
    /// In-flight requests are allowed to finish once shutdown starts.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local: SocketAddr = listener.local_addr()?;

        info!(address = %local, "HTTP control surface listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use cusf_core::application::{
        DataLayout, DownloadPolicy, Downloader, Installer, LauncherContext, Registry, Supervisor,
        WalletService,
    };
    use cusf_core::domain::HostOs;
    use cusf_core::port::control_plane::mocks::RecordingControlPlane;
    use cusf_core::port::extractor::mocks::MockExtractor;
    use cusf_core::port::process::mocks::{event_log, MockProbe, MockSpawner};
    use cusf_core::port::tool_runner::mocks::MockToolRunner;
    use cusf_core::port::transport::mocks::{MockFetch, MockTransport};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct TestApp {
        home: tempfile::TempDir,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_ui_dir(None)
        }

        fn with_ui_dir(ui_dir: Option<std::path::PathBuf>) -> Self {
            let home = tempfile::tempdir().unwrap();
            let context = Arc::new(LauncherContext::new(
                Registry::builtin(),
                DataLayout::for_host(HostOs::Linux, home.path()),
                HostOs::Linux,
            ));
            let mut app = Self::with_probe(home, context, MockProbe::new());
            app.state.ui_dir = ui_dir;
            app
        }

        fn with_probe(
            home: tempfile::TempDir,
            context: Arc<LauncherContext>,
            probe: MockProbe,
        ) -> Self {
            let events = event_log();
            let downloader = Downloader::new(
                Arc::new(MockTransport::always(MockFetch::Body(b"archive".to_vec()))),
                DownloadPolicy {
                    max_attempts: 1,
                    backoff: Duration::from_millis(1),
                    parallelism: 1,
                },
            );

            let state = AppState {
                installer: Arc::new(Installer::new(
                    context.clone(),
                    downloader,
                    Arc::new(MockExtractor::new()),
                )),
                supervisor: Arc::new(Supervisor::new(
                    context.clone(),
                    Arc::new(MockSpawner::new(events.clone())),
                    Arc::new(probe),
                    Arc::new(RecordingControlPlane::new(events)),
                )),
                wallet: Arc::new(WalletService::new(
                    context.clone(),
                    Arc::new(MockToolRunner::succeeding("{}")),
                )),
                context,
                ui_dir: None,
            };
            Self { home, state }
        }

        fn install(&self, name: &str) {
            let component = self.state.context.registry.component(name).unwrap();
            let path = self.state.context.executable_path(component).unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"bin").unwrap();
        }

        async fn send(&self, method: Method, uri: &str) -> (StatusCode, Value) {
            let response = router(self.state.clone())
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri).await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let (status, body) = app.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_check_reports_install_state() {
        let app = TestApp::new();

        let (status, body) = app.get("/check-thunder").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["exists"], false);
        assert!(body["path"]
            .as_str()
            .unwrap()
            .ends_with("downloads/l2/thunder-latest-x86_64-unknown-linux-gnu"));

        app.install("thunder");
        let (_, body) = app.get("/check-thunder").await;
        assert_eq!(body["exists"], true);
    }

    #[tokio::test]
    async fn test_start_missing_executable_is_500() {
        let app = TestApp::new();
        let (status, body) = app.get("/start-bitcoind").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_start_stop_roundtrip() {
        let app = TestApp::new();
        app.install("bitwindow");

        let (status, body) = app.get("/start-bitwindow").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["pid"].as_u64().is_some());

        let (_, body) = app.get("/processes").await;
        assert_eq!(body["processes"][0]["component"], "bitwindow");

        let (status, body) = app.send(Method::POST, "/stop-bitwindow").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "graceful");

        let (_, body) = app.get("/stop-bitwindow").await;
        assert_eq!(body["outcome"], "not_running");
    }

    #[tokio::test]
    async fn test_tools_have_no_lifecycle_routes() {
        let app = TestApp::new();

        let (status, _) = app.get("/start-grpcurl").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get("/check-grpcurl").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = TestApp::new();
        let (status, _) = app.get("/download-l3").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_and_delete_family() {
        let app = TestApp::new();

        let (status, body) = app.get("/download-thunder").await;
        assert_eq!(status, StatusCode::OK);
        let dir = body["path"].as_str().unwrap().to_string();
        assert!(Path::new(&dir).join("thunder.zip").exists());

        let (status, _) = app.get("/delete-thunder").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = app.send(Method::DELETE, "/delete-thunder").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!Path::new(&dir).exists());
    }

    #[tokio::test]
    async fn test_delete_refused_while_member_running() {
        let app = TestApp::new();
        app.install("bitwindow");
        app.get("/start-bitwindow").await;

        let (status, body) = app.send(Method::DELETE, "/delete-l1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Conflict"));
    }

    #[tokio::test]
    async fn test_reset_stops_everything_first() {
        let app = TestApp::new();
        app.install("thunder");
        app.get("/start-thunder").await;

        let (status, body) = app.send(Method::POST, "/reset-folders").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"].as_array().unwrap().len(), 1);
        assert!(app.state.supervisor.running().is_empty());
        assert!(!app.state.context.layout.downloads_dir().exists());
        assert!(app.home.path().exists());
    }

    #[tokio::test]
    async fn test_reset_preserves_log_directory() {
        let app = TestApp::new();
        let logs = app.state.context.layout.logs_dir();
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(logs.join("cusf-launcher.log"), b"open").unwrap();

        let (status, _) = app.send(Method::POST, "/reset-folders").await;

        assert_eq!(status, StatusCode::OK);
        assert!(logs.join("cusf-launcher.log").exists());
    }

    #[tokio::test]
    async fn test_extract_refused_while_member_running() {
        let app = TestApp::new();
        app.install("bitwindow");
        app.get("/start-bitwindow").await;

        let (status, body) = app.get("/extract-l1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Conflict"));
        assert!(app.state.supervisor.family_running("l1").await.unwrap());
    }

    #[tokio::test]
    async fn test_instance_from_earlier_session_blocks_delete() {
        let home = tempfile::tempdir().unwrap();
        let context = Arc::new(LauncherContext::new(
            Registry::builtin(),
            DataLayout::for_host(HostOs::Linux, home.path()),
            HostOs::Linux,
        ));
        let component = context.registry.component("bitwindow").unwrap();
        let path = context.executable_path(component).unwrap();
        let app = TestApp::with_probe(home, context, MockProbe::new().with_running(path, 777));

        let (status, body) = app.get("/stop-bitwindow").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "untracked");
        assert!(body["message"].as_str().unwrap().contains("not started by this launcher"));

        let (status, _) = app.send(Method::DELETE, "/delete-l1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_index_serves_ui_entry() {
        let ui = tempfile::tempdir().unwrap();
        std::fs::write(ui.path().join("index.html"), "<h1>launcher</h1>").unwrap();
        let app = TestApp::with_ui_dir(Some(ui.path().to_path_buf()));

        let response = router(app.state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>launcher</h1>");
    }
}
