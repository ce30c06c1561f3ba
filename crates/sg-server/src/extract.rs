//! Request extractors.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use sg_core::ClientIdentity;
use sg_token::{resolve_identity, FORWARDED_FOR};

/// The identity tokens are bound to for this request: the first
/// `X-Forwarded-For` hop, else the peer address, else `unknown`.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub ClientIdentity);

impl<S: Send + Sync> FromRequestParts<S> for RequestIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(resolve_identity(forwarded, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn identity_of(request: Request<()>) -> String {
        let (mut parts, _) = request.into_parts();
        let RequestIdentity(identity) = RequestIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        identity.as_str().to_string()
    }

    #[tokio::test]
    async fn prefers_forwarded_header() {
        let mut request = Request::builder()
            .header("X-Forwarded-For", "198.51.100.4, 10.0.0.1")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
        assert_eq!(identity_of(request).await, "198.51.100.4");
    }

    #[tokio::test]
    async fn falls_back_to_connect_info() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(identity_of(request).await, "192.0.2.1");
    }

    #[tokio::test]
    async fn unknown_without_transport_info() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(identity_of(request).await, "unknown");
    }
}
