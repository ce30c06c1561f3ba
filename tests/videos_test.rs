//! HTTP-level tests for the listing and health endpoints.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{payload, TestHarness, LOOPBACK};
use sg_probe::{MediaMetadata, Prober};

/// Prober that knows one file and fails on everything else.
struct CatalogProber;

impl Prober for CatalogProber {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn probe(&self, path: &Path) -> sg_core::Result<MediaMetadata> {
        match path.file_stem().and_then(|s| s.to_str()) {
            Some("keynote") => Ok(MediaMetadata {
                title: "Opening Keynote".into(),
                author: "Ada Example".into(),
                topic: "Conference".into(),
                duration: 754.5,
                resolution: "1920x1080".into(),
            }),
            _ => Err(sg_core::Error::Probe("not in catalog".into())),
        }
    }

    fn supports(&self, _path: &Path) -> bool {
        true
    }
}

#[tokio::test]
async fn health_is_ok() {
    let (_h, addr) = TestHarness::with_server(&[]).await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn lists_resources_sorted_with_defaults() {
    let (_h, addr) = TestHarness::with_server(&[
        ("beta.mp4", &payload(300)),
        ("alpha.mp4", &payload(200)),
        ("notes.txt", b"skip me"),
    ])
    .await;

    let resp = reqwest::get(format!("http://{addr}/api/videos")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let entries: Vec<serde_json::Value> = resp.json().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "alpha");
    assert_eq!(entries[1]["id"], "beta");

    let alpha = &entries[0];
    assert_eq!(alpha["size"], 200);
    assert_eq!(alpha["title"], "Unknown");
    assert_eq!(alpha["author"], "Unknown");
    assert_eq!(alpha["topic"], "Unknown");
    assert_eq!(alpha["duration"], 0.0);
    assert_eq!(alpha["resolution"], "Unknown");

    let url = alpha["url"].as_str().unwrap();
    assert!(url.starts_with("/api/stream/alpha?token="));
    assert!(url.ends_with(&format!("&ip={LOOPBACK}")));
}

#[tokio::test]
async fn listed_urls_stream_for_the_same_client() {
    let data = payload(4096);
    let (_h, addr) = TestHarness::with_server(&[("clip.mp4", &data)]).await;
    let client = reqwest::Client::new();

    let entries: Vec<serde_json::Value> = client
        .get(format!("http://{addr}/api/videos"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let url = entries[0]["url"].as_str().unwrap();

    let resp = client
        .get(format!("http://{addr}{url}"))
        .header("Range", "bytes=100-199")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[100..200]);
}

#[tokio::test]
async fn listing_binds_forwarded_identity() {
    let (_h, addr) = TestHarness::with_server(&[("clip.mp4", &payload(16))]).await;
    let client = reqwest::Client::new();

    let entries: Vec<serde_json::Value> = client
        .get(format!("http://{addr}/api/videos"))
        .header("X-Forwarded-For", "198.51.100.7")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let url = entries[0]["url"].as_str().unwrap().to_string();
    assert!(url.ends_with("&ip=198.51.100.7"));

    let direct = client.get(format!("http://{addr}{url}")).send().await.unwrap();
    assert_eq!(direct.status(), 403);

    let forwarded = client
        .get(format!("http://{addr}{url}"))
        .header("X-Forwarded-For", "198.51.100.7")
        .send()
        .await
        .unwrap();
    assert_eq!(forwarded.status(), 200);
}

#[tokio::test]
async fn listing_uses_injected_prober() {
    let mut h = TestHarness::with_files(&[
        ("keynote.mp4", &payload(64)),
        ("raw.mp4", &payload(32)),
    ]);
    h.ctx = h.ctx.clone().with_prober(Arc::new(CatalogProber));
    let (_h, addr) = h.serve().await;

    let entries: Vec<serde_json::Value> = reqwest::get(format!("http://{addr}/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let keynote = &entries[0];
    assert_eq!(keynote["id"], "keynote");
    assert_eq!(keynote["title"], "Opening Keynote");
    assert_eq!(keynote["author"], "Ada Example");
    assert_eq!(keynote["topic"], "Conference");
    assert_eq!(keynote["duration"], 754.5);
    assert_eq!(keynote["resolution"], "1920x1080");
    assert_eq!(keynote["size"], 64);

    // A failed probe still lists the resource with placeholders.
    let raw = &entries[1];
    assert_eq!(raw["id"], "raw");
    assert_eq!(raw["title"], "Unknown");
    assert_eq!(raw["duration"], 0.0);
}

#[tokio::test]
async fn unreadable_store_is_500() {
    let h = TestHarness::build(&[], |c| {
        c.store.root = std::path::PathBuf::from("/definitely/not/a/media/root");
    });
    let (_h, addr) = h.serve().await;

    let resp = reqwest::get(format!("http://{addr}/api/videos")).await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Unable to read media directory.");
    assert!(body["request_id"].is_string());
}
