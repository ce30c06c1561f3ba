//! Resource listing with freshly signed access URLs.

use std::path::PathBuf;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sg_core::{Error, ResourceId};
use sg_probe::MediaMetadata;

use crate::context::AppContext;
use crate::error::AppError;
use crate::extract::RequestIdentity;
use crate::middleware::request_id::RequestId;
use crate::STREAM_BASE;

/// Client-facing message when the store cannot be enumerated.
pub const LIST_FAILED: &str = "Unable to read media directory.";

/// One entry of `GET /api/videos`.
#[derive(Debug, Serialize)]
pub struct VideoEntry {
    pub id: ResourceId,
    #[serde(flatten)]
    pub metadata: MediaMetadata,
    /// Size in bytes.
    pub size: u64,
    /// Signed access URL bound to the caller.
    pub url: String,
}

/// GET /api/videos
pub async fn list_videos(
    State(ctx): State<AppContext>,
    RequestIdentity(identity): RequestIdentity,
    RequestId(request_id): RequestId,
) -> Result<Json<Vec<VideoEntry>>, AppError> {
    let resources = ctx.store.list().await.map_err(|e| {
        AppError::new(e)
            .with_message(LIST_FAILED)
            .with_request_id(request_id.clone())
    })?;

    // Probing reads files synchronously; keep it off the async workers.
    let prober = ctx.prober.clone();
    let paths: Vec<PathBuf> = resources.iter().map(|r| r.location.clone()).collect();
    let metadata = tokio::task::spawn_blocking(move || {
        paths
            .iter()
            .map(|path| sg_probe::metadata_or_default(prober.as_ref(), path))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        AppError::new(Error::Internal(format!("metadata task failed: {e}")))
            .with_request_id(request_id.clone())
    })?;

    let entries: Vec<VideoEntry> = resources
        .into_iter()
        .zip(metadata)
        .map(|(resource, metadata)| {
            let grant = ctx.codec.issue(&resource.id, &identity);
            VideoEntry {
                url: grant.access_url(STREAM_BASE),
                id: resource.id,
                metadata,
                size: resource.size,
            }
        })
        .collect();

    tracing::debug!(count = entries.len(), identity = %identity, "listed resources");
    Ok(Json(entries))
}
