// CUSF Core - Domain Logic & Ports
// NO infrastructure dependencies: HTTP, archives and processes sit behind ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{LauncherError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
