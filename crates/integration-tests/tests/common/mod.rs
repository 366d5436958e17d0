//! Shared fixtures: a throwaway artifact server and a one-family registry

#![allow(dead_code)]

use axum::Router;
use cusf_core::application::{DataLayout, LauncherContext, Registry};
use cusf_core::domain::{
    ComponentDescriptor, ComponentFamily, ComponentId, HostOs, PerOs, PostInstall, StopProcedure,
};
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use zip::write::SimpleFileOptions;

pub const FAMILY: &str = "demo";
pub const NODE: &str = "demo-node";
pub const EXECUTABLE: &str = "demo-node/run.sh";

/// Serve `router` on an ephemeral localhost port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// In-memory zip holding one executable script at [`EXECUTABLE`]
pub fn script_zip(script: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .add_directory("demo-node/", SimpleFileOptions::default())
        .unwrap();
    writer
        .start_file(
            EXECUTABLE,
            SimpleFileOptions::default().unix_permissions(0o644),
        )
        .unwrap();
    writer.write_all(script.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn node_descriptor(url: String, stop: StopProcedure) -> ComponentDescriptor {
    ComponentDescriptor {
        id: ComponentId::new(NODE),
        display_name: "Demo node".to_string(),
        family: FAMILY.to_string(),
        download_url: PerOs::uniform(url),
        archive_filename: PerOs::uniform("demo.zip".to_string()),
        executable: PerOs::uniform(EXECUTABLE.to_string()),
        args: vec![],
        launchable: true,
        stop,
        grace_period: Duration::from_millis(500),
        shutdown_rank: 1,
        post_install: vec![PostInstall::MarkExecutable],
    }
}

pub fn context(home: &std::path::Path, node: ComponentDescriptor) -> Arc<LauncherContext> {
    let registry = Registry::new(vec![ComponentFamily::new(FAMILY, "demo")], vec![node]).unwrap();
    Arc::new(LauncherContext::new(
        registry,
        DataLayout::for_host(HostOs::Linux, home),
        HostOs::Linux,
    ))
}
