// Wallet Service - drives the enforcer's gRPC wallet API through grpcurl

use std::sync::Arc;
use tracing::{info, warn};

use super::constants::{CREATE_WALLET_METHOD, ENFORCER_GRPC_PORT, WALLET_TOOL, WALLET_TOOL_TIMEOUT};
use super::context::LauncherContext;
use crate::error::{LauncherError, Result};
use crate::port::ToolRunner;

pub struct WalletService {
    context: Arc<LauncherContext>,
    runner: Arc<dyn ToolRunner>,
}

impl WalletService {
    pub fn new(context: Arc<LauncherContext>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { context, runner }
    }

    fn create_wallet_args() -> Vec<String> {
        vec![
            "-plaintext".to_string(),
            "-d".to_string(),
            "{}".to_string(),
            format!("127.0.0.1:{}", ENFORCER_GRPC_PORT),
            CREATE_WALLET_METHOD.to_string(),
        ]
    }

    /// Ask the running enforcer to create its wallet; returns the tool's stdout
    ///
    /// # Errors
    /// - LauncherError::ExecutableNotFound if grpcurl is not installed
    /// - LauncherError::ToolFailed on a non-zero exit (message carries stderr)
    pub async fn create_wallet(&self) -> Result<String> {
        let tool = self.context.registry.component(WALLET_TOOL)?;
        let path = self.context.executable_path(tool)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(LauncherError::ExecutableNotFound {
                component: tool.id.clone(),
                path,
            });
        }

        info!(tool = %path.display(), method = CREATE_WALLET_METHOD, "Creating wallet");
        let output = self
            .runner
            .run(&path, &Self::create_wallet_args(), WALLET_TOOL_TIMEOUT)
            .await?;

        if !output.success() {
            warn!(exit_code = ?output.exit_code, stderr = %output.stderr.trim(), "Wallet creation failed");
            return Err(LauncherError::ToolFailed {
                tool: WALLET_TOOL.to_string(),
                reason: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout::DataLayout;
    use crate::application::registry::Registry;
    use crate::domain::HostOs;
    use crate::port::tool_runner::mocks::MockToolRunner;

    fn context(home: &std::path::Path) -> Arc<LauncherContext> {
        Arc::new(LauncherContext::new(
            Registry::builtin(),
            DataLayout::for_host(HostOs::Linux, home),
            HostOs::Linux,
        ))
    }

    fn install_grpcurl(ctx: &LauncherContext) {
        let tool = ctx.registry.component(WALLET_TOOL).unwrap();
        let path = ctx.executable_path(tool).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"bin").unwrap();
    }

    #[tokio::test]
    async fn test_create_wallet_without_tool() {
        let home = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockToolRunner::succeeding("{}"));
        let service = WalletService::new(context(home.path()), runner.clone());

        let result = service.create_wallet().await;

        assert!(matches!(
            result,
            Err(LauncherError::ExecutableNotFound { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_wallet_invocation() {
        let home = tempfile::tempdir().unwrap();
        let ctx = context(home.path());
        install_grpcurl(&ctx);
        let runner = Arc::new(MockToolRunner::succeeding("{\"mnemonic\":\"abandon\"}"));
        let service = WalletService::new(ctx, runner.clone());

        let stdout = service.create_wallet().await.unwrap();

        assert!(stdout.contains("mnemonic"));
        assert_eq!(
            runner.calls(),
            vec![vec![
                "-plaintext".to_string(),
                "-d".to_string(),
                "{}".to_string(),
                "127.0.0.1:50051".to_string(),
                "cusf.mainchain.v1.WalletService/CreateWallet".to_string(),
            ]]
        );
    }

    #[tokio::test]
    async fn test_create_wallet_failure_carries_stderr() {
        let home = tempfile::tempdir().unwrap();
        let ctx = context(home.path());
        install_grpcurl(&ctx);
        let runner = Arc::new(MockToolRunner::failing("wallet already exists\n"));
        let service = WalletService::new(ctx, runner);

        match service.create_wallet().await {
            Err(LauncherError::ToolFailed { reason, .. }) => {
                assert_eq!(reason, "wallet already exists")
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }
}
