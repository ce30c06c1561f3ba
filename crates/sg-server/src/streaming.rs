//! Range-window streaming.
//!
//! Bodies are pulled from storage in frames of at most the configured chunk
//! size, so memory per transfer stays bounded regardless of resource size.
//! Each body owns a [`TransferGuard`]; dropping the body (client went away)
//! drops the reader and records the outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::StreamExt;
use tokio_util::io::ReaderStream;

use sg_core::{Error, ResourceId};
use sg_media::{MediaResource, ResolvedRange, WindowReader};

use crate::context::AppContext;

/// Counts of streaming transfers since startup.
#[derive(Debug, Default)]
pub struct TransferTracker {
    active: AtomicU64,
    completed: AtomicU64,
    aborted: AtomicU64,
}

/// Point-in-time copy of the tracker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub active: u64,
    pub completed: u64,
    pub aborted: u64,
}

impl TransferTracker {
    /// Register a transfer of `expected` bytes.
    pub fn begin(self: &Arc<Self>, resource: ResourceId, expected: u64) -> TransferGuard {
        self.active.fetch_add(1, Ordering::Relaxed);
        TransferGuard {
            tracker: Arc::clone(self),
            resource,
            expected,
            sent: 0,
        }
    }

    pub fn snapshot(&self) -> TransferStats {
        TransferStats {
            active: self.active.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }
}

/// Tracks one in-flight transfer. A transfer that is dropped before all
/// expected bytes were handed to the transport counts as aborted.
#[derive(Debug)]
pub struct TransferGuard {
    tracker: Arc<TransferTracker>,
    resource: ResourceId,
    expected: u64,
    sent: u64,
}

impl TransferGuard {
    fn record(&mut self, n: usize) {
        self.sent = self.sent.saturating_add(n as u64);
    }
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::Relaxed);
        if self.sent >= self.expected {
            self.tracker.completed.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(resource = %self.resource, bytes = self.sent, "transfer completed");
        } else {
            self.tracker.aborted.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                resource = %self.resource,
                sent = self.sent,
                expected = self.expected,
                "transfer aborted"
            );
        }
    }
}

/// Wrap a window reader in a pull-based body of frames no larger than
/// `chunk_size`.
pub fn window_body(reader: WindowReader, mut guard: TransferGuard, chunk_size: usize) -> Body {
    let stream = async_stream::stream! {
        let mut frames = ReaderStream::with_capacity(reader, chunk_size);
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(bytes) => {
                    guard.record(bytes.len());
                    yield Ok(bytes);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "read failed mid-stream");
                    yield Err(e);
                    break;
                }
            }
        }
    };
    Body::from_stream(stream)
}

/// Build the 200/206 response for `range` of `resource`.
///
/// The reader is opened before any header is produced, so a vanished file
/// still yields a clean 404.
pub async fn serve_window(
    ctx: &AppContext,
    resource: &MediaResource,
    range: ResolvedRange,
) -> sg_core::Result<Response> {
    let len = range.len();
    let reader = ctx.store.open_window(resource, range.offset(), len).await?;
    let guard = ctx.transfers.begin(resource.id.clone(), len);
    let body = window_body(reader, guard, ctx.chunk_size());
    window_response(resource, range, body)
}

/// Headers of [`serve_window`] without opening the resource. HEAD requests
/// never start a transfer, so they do not show up in the counters.
pub fn head_window(resource: &MediaResource, range: ResolvedRange) -> sg_core::Result<Response> {
    window_response(resource, range, Body::empty())
}

fn window_response(
    resource: &MediaResource,
    range: ResolvedRange,
    body: Body,
) -> sg_core::Result<Response> {
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, resource.content_type)
        .header(header::CONTENT_LENGTH, range.len())
        .header(header::ACCEPT_RANGES, "bytes");

    builder = match range {
        ResolvedRange::Partial(window) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, window.content_range()),
        ResolvedRange::Full { .. } => builder.status(StatusCode::OK),
    };

    builder
        .body(body)
        .map_err(|e| Error::Internal(format!("failed to build stream response: {e}")))
}
