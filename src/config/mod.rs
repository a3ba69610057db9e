//! Context-wide settings, read from `~/.config/fetchstore/config.toml`.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, RefreshConfig};
