// Domain Layer - Component descriptors and host identity

pub mod archive;
pub mod component;
pub mod host;

// Re-exports
pub use archive::ArchiveFormat;
pub use component::{
    ComponentDescriptor, ComponentFamily, ComponentId, PostInstall, ResolvedComponent,
    RpcEndpoint, StopProcedure,
};
pub use host::{HostOs, PerOs};
