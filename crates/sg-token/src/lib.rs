//! # sg-token
//!
//! The signed access-token protocol: who is asking ([`resolve_identity`]),
//! how an access URL is minted ([`TokenCodec`]), and how a presented token
//! is checked ([`TokenValidator`]).
//!
//! A token is `base64url(HMAC-SHA256(secret, "resource:expiry:identity"))`
//! without padding. It binds one resource, one expiry instant, and one
//! client identity; changing any of them invalidates it.
//!
//! ```
//! use sg_core::{ClientIdentity, ResourceId};
//! use sg_token::{SigningKey, TokenCodec, TokenValidator};
//!
//! let key = SigningKey::new(b"correct horse battery staple").unwrap();
//! let codec = TokenCodec::new(key, 3600);
//! let id = ResourceId::parse("intro").unwrap();
//! let who = ClientIdentity::new("203.0.113.7");
//!
//! let grant = codec.issue_at(&id, &who, 60, 1_000);
//! let validator = TokenValidator::new(codec);
//! assert!(validator.validate(&id, &grant.token, grant.expiry, &who, 1_060).is_ok());
//! ```

pub mod codec;
pub mod identity;
pub mod validator;

pub use codec::{canonicalize, AccessGrant, Signature, SigningKey, TokenCodec, SIGNATURE_LEN};
pub use identity::{resolve_identity, FORWARDED_FOR};
pub use validator::{Denial, TokenValidator};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;

/// Generate a random 32-byte signing secret, URL-safe base64 encoded.
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
