//! cardiac-core — shared types for the Cardiac AI prediction client.
//!
//! Holds everything about endpoint discovery that needs no network:
//! the execution context a client runs in, the naming conventions used
//! to guess where the backend lives, and the `cardiac.toml` config model.

pub mod candidates;
pub mod config;
pub mod error;
pub mod types;

pub use candidates::{NamingConventions, generate_candidates, health_url, is_loopback};
pub use config::{CardiacConfig, ResolverSettings, parse_duration};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
