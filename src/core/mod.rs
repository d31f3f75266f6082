/*!
 * Core Module
 * Shared types, limits, and configuration
 */

pub mod config;
pub mod limits;
pub mod types;

// Re-exports
pub use config::{AllocatorConfig, ConfigError};
pub use types::{Address, HeaderId, ModuleId, Size};
