//! Validated identifiers that participate in access-token canonicalization.
//!
//! A token signs `resource_id:expiry:client_identity`. [`ResourceId`] can
//! never contain `:` and the expiry is decimal digits, so the first two
//! colons always delimit the fields and the identity (which may be an IPv6
//! address) is whatever remains.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Field delimiter used by token canonicalization.
pub const CANONICAL_DELIMITER: char = ':';

const MAX_RESOURCE_ID_LEN: usize = 255;

/// Identifier of a stored media resource (the file stem in the store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Validate and wrap a resource identifier.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.is_empty() {
            return Err(Error::Validation("resource id is empty".into()));
        }
        if raw.len() > MAX_RESOURCE_ID_LEN {
            return Err(Error::Validation(format!(
                "resource id exceeds {MAX_RESOURCE_ID_LEN} bytes"
            )));
        }
        if raw.starts_with('.') {
            return Err(Error::Validation(
                "resource id must not start with '.'".into(),
            ));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| *c == CANONICAL_DELIMITER || *c == '/' || *c == '\\' || c.is_control())
        {
            return Err(Error::Validation(format!(
                "resource id contains forbidden character {bad:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Best-effort identity of the requesting client, bound into every token.
///
/// Usually an IP address taken from `X-Forwarded-For` or the transport peer.
/// The value is not authenticated; the signature over it is the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Identity used when neither a forwarded header nor a peer address is
    /// available.
    pub const UNKNOWN: &'static str = "unknown";

    /// Wrap an identity string as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The fallback identity.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
