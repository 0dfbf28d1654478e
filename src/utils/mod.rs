//! Utility functions
//!
//! Provides logging setup and input validation.

pub mod logging;
pub mod validation;

pub use logging::setup_logging;
pub use validation::{MAX_NAME_LENGTH, is_valid_name};
