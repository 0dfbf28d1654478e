//! Client management system
//!
//! Handles connection identity, the shared registry, and the per-connection
//! session loop.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::handle_connection;
pub use registry::{Registry, SharedRegistry};
pub use state::{ClientHandle, ConnectionId, ConnectionRecord, ConnectionState, Outbound};
