//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rpc / resilience / blockchain produce:
//!     → tracing events (structured fields: method, attempt, tx_id)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs a subscriber (binaries and tests only)
//!     → any metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber or recorder on its own
//! - Private keys and signatures are never logged

pub mod logging;
pub mod metrics;
