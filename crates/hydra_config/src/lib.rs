//! Parsing and validation of `hydra.toml` run configuration files.
//!
//! This crate reads a run configuration and produces a strongly-typed
//! [`HydraConfig`], then resolves it into the [`GridSpec`](hydra_net::GridSpec)
//! and [`SearchOptions`](hydra_net::SearchOptions) the generator consumes.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{resolve_run, ResolvedRun};
pub use types::*;
