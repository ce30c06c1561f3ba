//! Shared application context.
//!
//! [`AppContext`] is handed to every handler through Axum state. Everything
//! in it is immutable after startup except the transfer counters.

use std::sync::Arc;

use sg_core::config::Config;
use sg_media::{FsStore, MediaStore};
use sg_probe::Prober;
use sg_token::{SigningKey, TokenCodec, TokenValidator};

use crate::streaming::TransferTracker;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub codec: Arc<TokenCodec>,
    pub validator: Arc<TokenValidator>,
    pub store: Arc<dyn MediaStore>,
    pub prober: Arc<dyn Prober>,
    pub transfers: Arc<TransferTracker>,
}

impl AppContext {
    /// Build the context from configuration: signing key, filesystem store
    /// and the default prober chain.
    pub fn from_config(config: Config) -> sg_core::Result<Self> {
        let key = SigningKey::new(config.signing_secret()?)?;
        let codec = TokenCodec::new(key, config.signing.ttl_secs);
        let store = FsStore::from_config(&config.store);
        tracing::info!(
            root = %store.root().display(),
            ttl_secs = config.signing.ttl_secs,
            "Media store ready"
        );

        Ok(Self {
            validator: Arc::new(TokenValidator::new(codec.clone())),
            codec: Arc::new(codec),
            store: Arc::new(store),
            prober: Arc::new(sg_probe::default_prober()),
            transfers: Arc::new(TransferTracker::default()),
            config: Arc::new(config),
        })
    }

    /// Replace the metadata prober.
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Upper bound on a single streamed body frame.
    pub fn chunk_size(&self) -> usize {
        self.config.stream.effective_chunk_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_build_without_secret() {
        assert!(AppContext::from_config(Config::default()).is_err());
    }

    #[test]
    fn builds_with_secret() {
        let mut config = Config::default();
        config.signing.secret = Some("context-secret".into());
        config.stream.chunk_size = 0;
        let ctx = AppContext::from_config(config).unwrap();
        assert_eq!(ctx.codec.default_ttl_secs(), 86_400);
        assert_eq!(ctx.chunk_size(), 64 * 1024);
    }
}
