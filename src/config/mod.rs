//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ChatConfig, MetricsConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`validation`]: Startup validation of a loaded Config

mod listen;
mod types;
mod validation;

pub use listen::{DEFAULT_PORT, ListenConfig};
pub use types::{CONFIG_ENV, ChatConfig, Config, ConfigError, MetricsConfig};
pub use validation::{ValidationError, validate};
