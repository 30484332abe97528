// Library root — exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod bootstrap;
pub mod core;
pub mod subsystems;

pub use crate::core::{config, error};
pub use bootstrap::logger;
