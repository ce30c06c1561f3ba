//! Client identity policy.
//!
//! The first hop of `X-Forwarded-For` wins, then the transport peer address.
//! Neither source is authenticated: behind NAT or a proxy chain that rewrites
//! the header, legitimate clients can be rejected because the identity they
//! stream from differs from the one the URL was issued to.

use std::net::IpAddr;

use sg_core::ClientIdentity;

/// Lower-case name of the forwarded-for header.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Derive the identity bound into access tokens for a request.
pub fn resolve_identity(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> ClientIdentity {
    if let Some(first) = forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return ClientIdentity::new(first);
    }

    match peer {
        Some(ip) => ClientIdentity::new(unmap(ip).to_string()),
        None => ClientIdentity::unknown(),
    }
}

/// Dual-stack listeners report IPv4 peers as `::ffff:a.b.c.d`.
fn unmap(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}
