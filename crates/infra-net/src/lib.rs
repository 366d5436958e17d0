// CUSF Infrastructure - Network Adapters
// Implements: DownloadTransport, ControlPlane

pub mod control_plane_impl;
pub mod http_transport;

pub use control_plane_impl::JsonRpcControlPlane;
pub use http_transport::{ReqwestTransport, TransportConfig};
