//! Server core functionality
//!
//! This module contains the accept loop and the lifecycle hooks that bind
//! connections to the shared registry.

pub mod core;
pub mod lifecycle;

pub use self::core::Server;
pub use lifecycle::Lifecycle;
