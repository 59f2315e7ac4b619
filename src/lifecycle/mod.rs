//! Caller-owned cancellation.
//!
//! # Data Flow
//! ```text
//! Cancellation (owner) ──watch──▶ CancelSignal (clones)
//!     observed by: retry wait, RPC attempt, status poll tick
//! signals.rs: Ctrl-C → Cancellation::cancel
//! ```

pub mod cancel;
pub mod signals;

pub use cancel::{CancelSignal, Cancellation};
