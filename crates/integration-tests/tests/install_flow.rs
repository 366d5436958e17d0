//! Download and extraction against a real HTTP server

mod common;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use cusf_core::application::{DownloadPolicy, Downloader, Installer};
use cusf_core::domain::StopProcedure;
use cusf_core::LauncherError;
use cusf_infra_net::{ReqwestTransport, TransportConfig};
use cusf_infra_system::SystemExtractor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{context, node_descriptor, script_zip, serve, EXECUTABLE, FAMILY, NODE};

#[derive(Clone)]
struct Artifact {
    hits: Arc<AtomicUsize>,
    failures_before_success: usize,
    body: Arc<Vec<u8>>,
}

async fn latest() -> Redirect {
    Redirect::temporary("/files/demo.zip")
}

async fn artifact(State(artifact): State<Artifact>) -> Response {
    let hit = artifact.hits.fetch_add(1, Ordering::SeqCst);
    if hit < artifact.failures_before_success {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    (StatusCode::OK, artifact.body.to_vec()).into_response()
}

async fn artifact_server(failures_before_success: usize) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Artifact {
        hits: hits.clone(),
        failures_before_success,
        body: Arc::new(script_zip("#!/bin/sh\nexec sleep 30\n")),
    };
    let router = Router::new()
        .route("/latest", get(latest))
        .route("/files/demo.zip", get(artifact))
        .with_state(state);
    let addr = serve(router).await;
    (format!("http://{}/latest", addr), hits)
}

fn installer(home: &std::path::Path, url: String, max_attempts: u32) -> Installer {
    let transport = ReqwestTransport::new(TransportConfig {
        connect_timeout: Duration::from_secs(2),
        idle_timeout: Duration::from_secs(2),
        max_redirects: 3,
    })
    .unwrap();
    Installer::new(
        context(home, node_descriptor(url, StopProcedure::Signal)),
        Downloader::new(
            Arc::new(transport),
            DownloadPolicy {
                max_attempts,
                backoff: Duration::from_millis(10),
                parallelism: 1,
            },
        ),
        Arc::new(SystemExtractor::new()),
    )
}

#[tokio::test]
async fn test_download_survives_transient_failures_behind_redirect() {
    let home = tempfile::tempdir().unwrap();
    let (url, hits) = artifact_server(2).await;
    let installer = installer(home.path(), url, 3);

    let report = installer.download_family(FAMILY).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(report.artifacts.len(), 1);
    let size = std::fs::metadata(&report.artifacts[0]).unwrap().len();
    assert!(size > 0);
}

#[tokio::test]
async fn test_download_gives_up_after_budget() {
    let home = tempfile::tempdir().unwrap();
    let (url, hits) = artifact_server(5).await;
    let installer = installer(home.path(), url, 2);

    let err = installer.download_family(FAMILY).await.unwrap_err();

    assert!(matches!(
        err,
        LauncherError::DownloadFailed { attempts: 2, .. }
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    let ctx = context(
        home.path(),
        node_descriptor(String::new(), StopProcedure::Signal),
    );
    let archive = ctx
        .archive_path(ctx.registry.component(NODE).unwrap())
        .unwrap();
    assert!(!archive.exists(), "partial artifact must not be left behind");
}

#[tokio::test]
async fn test_extract_installs_executable() {
    let home = tempfile::tempdir().unwrap();
    let (url, _) = artifact_server(0).await;
    let installer = installer(home.path(), url, 1);

    let downloaded = installer.download_family(FAMILY).await.unwrap();
    let extracted = installer.extract_family(FAMILY).await.unwrap();
    assert_eq!(downloaded.path, extracted.path);

    let executable = extracted.path.join(EXECUTABLE);
    assert!(executable.exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&executable).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    let dir = installer.delete_family(FAMILY).await.unwrap();
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_extract_without_download_is_not_found() {
    let home = tempfile::tempdir().unwrap();
    let installer = installer(home.path(), "http://127.0.0.1:9/none".to_string(), 1);

    let err = installer.extract_family(FAMILY).await.unwrap_err();

    assert!(matches!(err, LauncherError::NotFound(_)));
}
