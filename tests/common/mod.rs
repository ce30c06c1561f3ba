//! Shared test harness for integration tests.
//!
//! [`TestHarness`] owns a temporary media store and an [`AppContext`] signed
//! with a known secret. [`TestHarness::with_server`] starts Axum on a random
//! port with connect info, so the peer address is the client identity.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use tempfile::TempDir;

use sg_core::config::Config;
use sg_core::{ClientIdentity, ResourceId};
use sg_server::{build_router, AppContext, STREAM_BASE};
use sg_token::AccessGrant;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Identity of a reqwest client talking to the harness over loopback.
pub const LOOPBACK: &str = "127.0.0.1";

pub struct TestHarness {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestHarness {
    /// Store containing `files` (name, contents), default settings.
    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        Self::build(files, |_| {})
    }

    /// Like [`with_files`](Self::with_files) but lets the caller adjust the
    /// config before the context is built.
    pub fn build(files: &[(&str, &[u8])], tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for (name, data) in files {
            std::fs::write(dir.path().join(name), data).expect("failed to write fixture");
        }

        let mut config = Config::default();
        config.signing.secret = Some(SECRET.into());
        config.store.root = dir.path().to_path_buf();
        tweak(&mut config);

        let ctx = AppContext::from_config(config).expect("failed to build context");
        Self { ctx, dir }
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone())
    }

    /// Start the router on a random loopback port.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");
        let app = self.router();

        tokio::spawn(async move {
            sg_server::serve(listener, app, std::future::pending()).await.ok();
        });

        (self, addr)
    }

    pub async fn with_server(files: &[(&str, &[u8])]) -> (Self, SocketAddr) {
        Self::with_files(files).serve().await
    }

    /// Issue a grant with the server's own codec.
    pub fn grant(&self, resource: &str, identity: &str) -> AccessGrant {
        self.ctx.codec.issue(&id(resource), &ClientIdentity::new(identity))
    }

    /// Issue a grant valid for `ttl` seconds from `now`.
    pub fn grant_at(&self, resource: &str, identity: &str, ttl: u64, now: u64) -> AccessGrant {
        self.ctx
            .codec
            .issue_at(&id(resource), &ClientIdentity::new(identity), ttl, now)
    }
}

pub fn id(s: &str) -> ResourceId {
    ResourceId::parse(s).expect("invalid resource id in test")
}

/// Absolute URL for `grant` on a running harness.
pub fn url(addr: SocketAddr, grant: &AccessGrant) -> String {
    format!("http://{addr}{}", grant.access_url(STREAM_BASE))
}

/// Deterministic, non-repeating-looking test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
