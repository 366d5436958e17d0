// CUSF Infrastructure - System Adapters
// Implements: ProcessSpawner, ProcessProbe, ToolRunner, ArchiveExtractor

pub mod archive_extractor;
pub mod detached_spawner;
pub mod process_probe_impl;
pub mod subprocess_runner;

pub use archive_extractor::SystemExtractor;
pub use detached_spawner::{ChildProcess, DetachedSpawner};
pub use process_probe_impl::SysinfoProbe;
pub use subprocess_runner::SubprocessRunner;
