//! Token registry service library.
//!
//! Provides an in-process DIP721 registry, the schema-checked call
//! dispatcher in front of it, snapshot persistence and configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod tracing_config;

// Re-exports for convenience
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::RegistryError;
pub use registry::App;
