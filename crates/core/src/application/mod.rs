// Application Layer - Lifecycle services

pub mod constants;
pub mod context;
pub mod downloader;
pub mod installer;
pub mod layout;
pub mod node_config;
pub mod registry;
pub mod shutdown;
pub mod supervisor;
pub mod wallet;

// Re-exports
pub use context::LauncherContext;
pub use downloader::{DownloadJob, DownloadPolicy, Downloader};
pub use installer::{FamilyReport, Installer};
pub use layout::DataLayout;
pub use registry::Registry;
pub use shutdown::{shutdown_channel, ShutdownReason, ShutdownSender, ShutdownToken};
pub use supervisor::{RunningProcess, StopOutcome, Supervisor};
pub use wallet::WalletService;
