// Port Layer - Interfaces for external dependencies

pub mod control_plane;
pub mod extractor;
pub mod process;
pub mod tool_runner;
pub mod transport;

// Re-exports
pub use control_plane::{ControlPlane, ControlPlaneError};
pub use extractor::{ArchiveExtractor, ExtractError};
pub use process::{ProcessError, ProcessHandle, ProcessProbe, ProcessSpawner};
pub use tool_runner::{ToolOutput, ToolRunner};
pub use transport::{DownloadTransport, FetchError};
