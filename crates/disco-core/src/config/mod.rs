//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use disco_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Relay port: {}", cfg.relay.port);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config, CREDENTIAL_ENV};
pub use schema::{AdvisorConfig, Config, ProviderConfig, RelayConfig, RetryConfig};
