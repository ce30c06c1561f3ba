//! Token issuance: canonicalization, HMAC signing, and access-URL rendering.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;

use sg_core::ids::CANONICAL_DELIMITER;
use sg_core::{ClientIdentity, Error, ResourceId};

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of an HMAC-SHA256 signature.
pub const SIGNATURE_LEN: usize = 32;

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// ---------------------------------------------------------------------------
// SigningKey / Signature
// ---------------------------------------------------------------------------

/// The process-wide HMAC secret. Immutable once constructed.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    /// Build a key from raw secret bytes. An empty secret is rejected.
    pub fn new(secret: impl AsRef<[u8]>) -> sg_core::Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(Error::Config("signing secret is empty".into()));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| Error::Config(format!("unusable signing secret: {e}")))?;
        Ok(Self { mac })
    }

    fn keyed(&self) -> HmacSha256 {
        self.mac.clone()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// A raw HMAC-SHA256 digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Encode as URL-safe base64 without padding (the wire token).
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Decode a wire token. Returns `None` unless it is URL-safe base64
    /// (no padding) of exactly [`SIGNATURE_LEN`] bytes.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
        let raw: [u8; SIGNATURE_LEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.encode())
    }
}

/// The signed message: `resource:expiry:identity`.
pub fn canonicalize(resource: &ResourceId, expiry: u64, identity: &ClientIdentity) -> String {
    let d = CANONICAL_DELIMITER;
    format!("{resource}{d}{expiry}{d}{identity}")
}

// ---------------------------------------------------------------------------
// TokenCodec
// ---------------------------------------------------------------------------

/// Mints access tokens and the URLs that carry them.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    default_ttl_secs: u64,
}

impl TokenCodec {
    pub fn new(key: SigningKey, default_ttl_secs: u64) -> Self {
        Self {
            key,
            default_ttl_secs,
        }
    }

    /// Lifetime applied by [`TokenCodec::issue`].
    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    /// Compute the signature over the canonical form of the three fields.
    pub fn sign(
        &self,
        resource: &ResourceId,
        expiry: u64,
        identity: &ClientIdentity,
    ) -> Signature {
        let mut mac = self.key.keyed();
        mac.update(canonicalize(resource, expiry, identity).as_bytes());
        let digest = mac.finalize().into_bytes();
        let mut raw = [0u8; SIGNATURE_LEN];
        raw.copy_from_slice(&digest);
        Signature(raw)
    }

    /// Check `provided` against the expected signature in constant time.
    ///
    /// `verify_slice` compares every byte regardless of where the first
    /// mismatch is.
    pub fn verify(
        &self,
        resource: &ResourceId,
        expiry: u64,
        identity: &ClientIdentity,
        provided: &Signature,
    ) -> bool {
        let mut mac = self.key.keyed();
        mac.update(canonicalize(resource, expiry, identity).as_bytes());
        mac.verify_slice(provided.as_bytes()).is_ok()
    }

    /// Issue a grant valid for the default TTL from now.
    pub fn issue(&self, resource: &ResourceId, identity: &ClientIdentity) -> AccessGrant {
        self.issue_at(resource, identity, self.default_ttl_secs, sg_core::unix_now())
    }

    /// Issue a grant valid for `ttl_secs` from `now` (Unix seconds).
    pub fn issue_at(
        &self,
        resource: &ResourceId,
        identity: &ClientIdentity,
        ttl_secs: u64,
        now: u64,
    ) -> AccessGrant {
        let expiry = now.saturating_add(ttl_secs);
        let signature = self.sign(resource, expiry, identity);
        AccessGrant {
            resource_id: resource.clone(),
            expiry,
            client_identity: identity.clone(),
            token: signature.encode(),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessGrant
// ---------------------------------------------------------------------------

/// An issued token together with the fields it was computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub resource_id: ResourceId,
    /// Unix seconds after which the grant is rejected.
    pub expiry: u64,
    pub client_identity: ClientIdentity,
    /// URL-safe base64 signature.
    pub token: String,
}

impl AccessGrant {
    /// Render the access URL under `base`, e.g. `/api/stream`:
    /// `{base}/{id}?token={t}&expires={e}&ip={identity}`.
    pub fn access_url(&self, base: &str) -> String {
        format!(
            "{}/{}?token={}&expires={}&ip={}",
            base.trim_end_matches('/'),
            utf8_percent_encode(self.resource_id.as_str(), URL_COMPONENT),
            self.token,
            self.expiry,
            utf8_percent_encode(self.client_identity.as_str(), URL_COMPONENT),
        )
    }
}
