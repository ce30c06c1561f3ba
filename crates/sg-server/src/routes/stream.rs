//! Signed-URL streaming endpoint.
//!
//! Per request: authorize, locate, resolve the range, then stream. Every
//! authorization failure yields the same 403 body; the reason is only
//! logged.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method};
use axum::response::Response;
use serde::Deserialize;

use sg_core::{ClientIdentity, Error, ResourceId};
use sg_media::resolve_range;

use crate::context::AppContext;
use crate::error::AppError;
use crate::extract::RequestIdentity;
use crate::middleware::request_id::RequestId;
use crate::streaming::{head_window, serve_window};

/// Query parameters of an access URL. All optional so that a missing one
/// is a 403 rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
    pub expires: Option<String>,
    /// Identity the URL was issued to. Informational only.
    pub ip: Option<String>,
}

/// GET /api/stream/{resource_id}
///
/// Path and query rejections are folded into the generic 403: a URL that
/// does not even decode can never have been issued.
pub async fn stream_resource(
    State(ctx): State<AppContext>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<StreamQuery>, QueryRejection>,
    RequestIdentity(identity): RequestIdentity,
    RequestId(request_id): RequestId,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (Path(resource_id), Query(query)) = match (path, query) {
        (Ok(path), Ok(query)) => (path, query),
        (Err(e), _) => return Err(undecodable(&identity, &e.body_text(), request_id)),
        (_, Err(e)) => return Err(undecodable(&identity, &e.body_text(), request_id)),
    };

    serve(&ctx, &resource_id, &query, &identity, &method, &headers)
        .await
        .map_err(|e| AppError::new(e).with_request_id(request_id))
}

fn undecodable(identity: &ClientIdentity, reason: &str, request_id: String) -> AppError {
    tracing::warn!(identity = %identity, reason, "access denied: undecodable access URL");
    AppError::new(Error::access_denied()).with_request_id(request_id)
}

async fn serve(
    ctx: &AppContext,
    raw_id: &str,
    query: &StreamQuery,
    identity: &ClientIdentity,
    method: &Method,
    headers: &HeaderMap,
) -> sg_core::Result<Response> {
    let resource_id = authorize(ctx, raw_id, query, identity)?;

    let resource = ctx.store.locate(&resource_id).await?;

    let range_header = headers
        .get(header::RANGE)
        .map(|v| {
            v.to_str()
                .map_err(|_| Error::MalformedRange("range header is not visible ASCII".into()))
        })
        .transpose()?;
    let range = resolve_range(range_header, resource.size).map_err(|e| {
        tracing::debug!(resource = %resource_id, error = %e, "range rejected");
        Error::from(e)
    })?;

    tracing::debug!(
        resource = %resource_id,
        offset = range.offset(),
        len = range.len(),
        partial = range.is_partial(),
        "streaming"
    );
    if *method == Method::HEAD {
        return head_window(&resource, range);
    }
    serve_window(ctx, &resource, range).await
}

/// Check the signed URL against the identity of the current request.
fn authorize(
    ctx: &AppContext,
    raw_id: &str,
    query: &StreamQuery,
    identity: &ClientIdentity,
) -> sg_core::Result<ResourceId> {
    // An id that fails validation can never have been issued.
    let resource_id = ResourceId::parse(raw_id).map_err(|e| {
        tracing::warn!(identity = %identity, error = %e, "access denied: invalid resource id");
        Error::access_denied()
    })?;

    let token = query.token.as_deref().filter(|t| !t.is_empty());
    let expiry = query.expires.as_deref().and_then(|e| e.parse::<u64>().ok());
    let (Some(token), Some(expiry)) = (token, expiry) else {
        tracing::warn!(
            resource = %resource_id,
            identity = %identity,
            "access denied: missing or malformed token parameters"
        );
        return Err(Error::access_denied());
    };

    if let Some(claimed) = query.ip.as_deref() {
        if claimed != identity.as_str() {
            tracing::debug!(
                resource = %resource_id,
                claimed,
                identity = %identity,
                "ip parameter differs from request identity"
            );
        }
    }

    ctx.validator
        .validate(&resource_id, token, expiry, identity, sg_core::unix_now())
        .map_err(|denial| {
            tracing::warn!(
                resource = %resource_id,
                identity = %identity,
                reason = %denial,
                "access denied"
            );
            Error::from(denial)
        })?;

    tracing::debug!(resource = %resource_id, identity = %identity, "authorized");
    Ok(resource_id)
}
