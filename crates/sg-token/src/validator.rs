//! Token validation.

use sg_core::{ClientIdentity, ResourceId};

use crate::codec::{Signature, TokenCodec};

/// Why a token was rejected. Never sent to clients; see
/// [`sg_core::Error::access_denied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// The current time is past the token's expiry.
    #[error("token expired")]
    Expired,
    /// The presented signature does not match the expected one.
    #[error("signature mismatch")]
    BadSignature,
}

impl From<Denial> for sg_core::Error {
    fn from(_: Denial) -> Self {
        sg_core::Error::access_denied()
    }
}

/// Checks presented tokens against the shared secret.
///
/// Validation is a pure function of its inputs plus the secret: nothing is
/// recorded, so a token can be presented any number of times until expiry.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
}

impl TokenValidator {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Validate `token` for the given fields at time `now` (Unix seconds).
    ///
    /// A token is still valid at exactly `expiry` and expired one second
    /// later. Expiry is checked before the signature.
    pub fn validate(
        &self,
        resource: &ResourceId,
        token: &str,
        expiry: u64,
        identity: &ClientIdentity,
        now: u64,
    ) -> Result<(), Denial> {
        if now > expiry {
            return Err(Denial::Expired);
        }

        let provided = Signature::decode(token).ok_or(Denial::BadSignature)?;

        if self.codec.verify(resource, expiry, identity, &provided) {
            Ok(())
        } else {
            Err(Denial::BadSignature)
        }
    }
}
