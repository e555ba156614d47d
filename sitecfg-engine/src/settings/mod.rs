//! Engine settings
//!
//! Read once at start-up from `sitecfg.toml`; the engine never reloads them.

mod defaults;
mod loader;
mod schema;

pub use defaults::DEFAULT_SETTINGS_TOML;
pub use loader::SettingsLoader;
pub use schema::*;
