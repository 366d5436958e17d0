//! Full lifecycle over HTTP with every real adapter wired in
#![cfg(unix)]

mod common;

use axum::routing::get;
use axum::Router;
use cusf_api_http::{router, AppState};
use cusf_core::application::{DownloadPolicy, Downloader, Installer, Supervisor, WalletService};
use cusf_core::domain::StopProcedure;
use cusf_infra_net::{JsonRpcControlPlane, ReqwestTransport, TransportConfig};
use cusf_infra_system::{DetachedSpawner, SubprocessRunner, SysinfoProbe, SystemExtractor};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use common::{context, node_descriptor, script_zip, serve, FAMILY, NODE};

async fn launcher(home: &std::path::Path) -> String {
    let zip = script_zip("#!/bin/sh\nexec sleep 30\n");
    let artifacts = serve(Router::new().route(
        "/demo.zip",
        get(move || {
            let zip = zip.clone();
            async move { zip }
        }),
    ))
    .await;

    let context = context(
        home,
        node_descriptor(
            format!("http://{}/demo.zip", artifacts),
            StopProcedure::Signal,
        ),
    );
    let transport = ReqwestTransport::new(TransportConfig::default()).unwrap();
    let state = AppState {
        installer: Arc::new(Installer::new(
            context.clone(),
            Downloader::new(
                Arc::new(transport),
                DownloadPolicy {
                    max_attempts: 1,
                    backoff: Duration::from_millis(10),
                    parallelism: 1,
                },
            ),
            Arc::new(SystemExtractor::new()),
        )),
        supervisor: Arc::new(Supervisor::new(
            context.clone(),
            Arc::new(DetachedSpawner::new()),
            Arc::new(SysinfoProbe::new()),
            Arc::new(JsonRpcControlPlane::new()),
        )),
        wallet: Arc::new(WalletService::new(
            context.clone(),
            Arc::new(SubprocessRunner::new()),
        )),
        context,
        ui_dir: None,
    };

    let addr = serve(router(state)).await;
    format!("http://{}", addr)
}

async fn call(method: reqwest::Method, url: String) -> (u16, Value) {
    let response = reqwest::Client::new()
        .request(method, url)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap_or(Value::Null))
}

async fn get_json(base: &str, path: &str) -> (u16, Value) {
    call(reqwest::Method::GET, format!("{}{}", base, path)).await
}

#[tokio::test]
async fn test_install_start_stop_delete() {
    let home = tempfile::tempdir().unwrap();
    let base = launcher(home.path()).await;

    let (status, body) = get_json(&base, &format!("/check-{}", NODE)).await;
    assert_eq!(status, 200);
    assert_eq!(body["exists"], false);

    let (status, body) = get_json(&base, &format!("/download-{}", FAMILY)).await;
    assert_eq!(status, 200, "{}", body);
    let (status, body) = get_json(&base, &format!("/extract-{}", FAMILY)).await;
    assert_eq!(status, 200, "{}", body);

    let (_, body) = get_json(&base, &format!("/check-{}", NODE)).await;
    assert_eq!(body["exists"], true);

    let (status, body) = get_json(&base, &format!("/start-{}", NODE)).await;
    assert_eq!(status, 200, "{}", body);
    let pid = body["pid"].as_u64().unwrap();

    let (_, body) = get_json(&base, "/processes").await;
    assert_eq!(body["processes"][0]["pid"].as_u64(), Some(pid));

    let (status, body) = call(
        reqwest::Method::DELETE,
        format!("{}/delete-{}", base, FAMILY),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);

    let (status, body) = call(reqwest::Method::POST, format!("{}/stop-{}", base, NODE)).await;
    assert_eq!(status, 200);
    assert_eq!(body["outcome"], "graceful");

    let (status, _) = call(
        reqwest::Method::DELETE,
        format!("{}/delete-{}", base, FAMILY),
    )
    .await;
    assert_eq!(status, 200);

    let (_, body) = get_json(&base, &format!("/check-{}", NODE)).await;
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn test_start_before_install_reports_error() {
    let home = tempfile::tempdir().unwrap();
    let base = launcher(home.path()).await;

    let (status, body) = get_json(&base, &format!("/start-{}", NODE)).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}
