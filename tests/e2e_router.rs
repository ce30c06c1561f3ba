//! In-process router tests using `tower::ServiceExt::oneshot`.
//!
//! No connect info is attached here, so requests without a forwarded header
//! resolve to the `unknown` identity.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::{payload, TestHarness};
use sg_server::STREAM_BASE;

fn stream_request(uri: &str, range: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri).header("x-forwarded-for", "192.0.2.44");
    if let Some(range) = range {
        builder = builder.header("range", range);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn unknown_identity_without_transport_info() {
    let h = TestHarness::with_files(&[("clip.mp4", &payload(32))]);
    let grant = h.grant("clip", "unknown");

    let resp = h
        .router()
        .oneshot(
            Request::get(grant.access_url(STREAM_BASE))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn abandoned_stream_is_counted_as_aborted() {
    let h = TestHarness::build(&[("big.mp4", &payload(1024 * 1024))], |c| {
        c.stream.chunk_size = 4096;
    });
    let grant = h.grant("big", "192.0.2.44");

    let resp = h
        .router()
        .oneshot(stream_request(&grant.access_url(STREAM_BASE), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.ctx.transfers.snapshot().active, 1);

    let mut body = resp.into_body();
    let first = body.frame().await.unwrap().unwrap().into_data().unwrap();
    assert!(first.len() <= 4096);
    drop(body);

    let stats = h.ctx.transfers.snapshot();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.aborted, 1);
    assert_eq!(stats.completed, 0);
}

#[tokio::test]
async fn head_reports_headers_without_a_transfer() {
    let h = TestHarness::with_files(&[("clip.mp4", &payload(1000))]);
    let grant = h.grant("clip", "192.0.2.44");

    let resp = h
        .router()
        .oneshot(
            Request::head(grant.access_url(STREAM_BASE))
                .header("x-forwarded-for", "192.0.2.44")
                .header("range", "bytes=0-99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.headers()["content-length"], "100");
    assert_eq!(resp.headers()["content-range"], "bytes 0-99/1000");

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
    assert_eq!(h.ctx.transfers.snapshot(), sg_server::TransferStats::default());
}

#[tokio::test]
async fn finished_stream_is_counted_as_completed() {
    let h = TestHarness::with_files(&[("clip.mp4", &payload(1000))]);
    let grant = h.grant("clip", "192.0.2.44");

    let resp = h
        .router()
        .oneshot(stream_request(&grant.access_url(STREAM_BASE), Some("bytes=0-99")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.len(), 100);

    let stats = h.ctx.transfers.snapshot();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.aborted, 0);
}

#[tokio::test]
async fn error_bodies_carry_request_id() {
    let h = TestHarness::with_files(&[]);
    let resp = h
        .router()
        .oneshot(
            Request::get("/api/stream/clip?token=x&expires=1")
                .header("x-request-id", "trace-me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers()["x-request-id"], "trace-me");

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "trace-me");
}

#[tokio::test]
async fn cors_exposes_range_headers() {
    let h = TestHarness::with_files(&[("clip.mp4", &payload(10))]);
    let grant = h.grant("clip", "192.0.2.44");

    let resp = h
        .router()
        .oneshot(
            Request::get(grant.access_url(STREAM_BASE))
                .header("x-forwarded-for", "192.0.2.44")
                .header("origin", "https://player.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let exposed = resp.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-range"));
    assert!(exposed.contains("accept-ranges"));
}
