//! sg-core: shared types, errors, and configuration.
//!
//! This crate is the foundational dependency for all other sg-* crates,
//! providing the unified error type, the validated identifiers that take
//! part in access-token canonicalization, and the process configuration.

pub mod config;
pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::{ClientIdentity, ResourceId};

/// Current wall-clock time as whole seconds since the Unix epoch.
///
/// Times before the epoch collapse to zero.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
