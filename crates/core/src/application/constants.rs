// Launcher constants (no magic values at call sites)
use std::time::Duration;

/// Application directory name under the OS data root
pub const APP_NAME: &str = "cusf_launcher";

/// Directory names used by earlier launcher releases, removed by reset-folders
pub const LEGACY_APP_NAMES: &[&str] = &["drivechain_launcher", "drivechain-launcher", "cusf-launcher"];

/// User-Agent sent with every download (release hosts reject anonymous clients)
pub const USER_AGENT: &str = concat!("CUSF-Launcher/", env!("CARGO_PKG_VERSION"));

/// Default number of attempts per download
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between download attempts (2s)
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Redirect hops followed before a download attempt fails
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Grace period for UI-only components (5s)
pub const UI_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Grace period for sidechain nodes (10s)
pub const SIDECHAIN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Grace period for the enforcer, which flushes its wallet and index (30s)
pub const ENFORCER_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Grace period for the L1 node, which flushes the chainstate (60s)
pub const NODE_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// How long to wait for exit after a forced kill before giving up on the handle
pub const FORCED_KILL_WAIT: Duration = Duration::from_secs(5);

/// Interval of the background reaper (5s)
pub const REAP_INTERVAL: Duration = Duration::from_secs(5);

/// Deadline for wallet-creation tool calls (30s)
pub const WALLET_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// L1 node JSON-RPC port (signet)
pub const NODE_RPC_PORT: u16 = 38332;

/// L1 node ZMQ sequence publisher port
pub const NODE_ZMQ_PORT: u16 = 29000;

/// Static RPC credentials shared by the node and the enforcer
pub const NODE_RPC_USER: &str = "user";
pub const NODE_RPC_PASSWORD: &str = "password";

/// Enforcer gRPC port (wallet service)
pub const ENFORCER_GRPC_PORT: u16 = 50051;

/// gRPC method invoked by create-wallet
pub const CREATE_WALLET_METHOD: &str = "cusf.mainchain.v1.WalletService/CreateWallet";

/// Component used as the RPC client tool for wallet creation
pub const WALLET_TOOL: &str = "grpcurl";
