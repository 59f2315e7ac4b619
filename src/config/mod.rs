//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → RpcClient::from_config / StatusPoller::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; clients copy what they need at construction
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::MulticallConfig;
pub use schema::Namespace;
pub use schema::ObservabilityConfig;
pub use schema::PollingConfig;
pub use schema::RetryConfig;
pub use schema::RpcConfig;
