//! sg-probe: descriptive metadata for listed media.
//!
//! Probing is best effort. [`metadata_or_default`] never fails: a file that
//! cannot be probed is listed with placeholder values.

pub mod atoms;
pub mod composite;
pub mod metadata;
pub mod mkv;
pub mod mp4;
pub mod prober;

use std::path::Path;

pub use composite::CompositeProber;
pub use metadata::{MediaMetadata, UNKNOWN};
pub use mkv::MkvProber;
pub use mp4::Mp4Prober;
pub use prober::Prober;

/// A prober covering every container the service knows about.
pub fn default_prober() -> CompositeProber {
    CompositeProber::new(vec![Box::new(Mp4Prober::new()), Box::new(MkvProber::new())])
}

/// Probe `path`, falling back to placeholder metadata on any failure.
pub fn metadata_or_default(prober: &dyn Prober, path: &Path) -> MediaMetadata {
    if !prober.supports(path) {
        tracing::debug!(path = %path.display(), "no prober for file; using defaults");
        return MediaMetadata::default();
    }
    match prober.probe(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "metadata extraction failed");
            MediaMetadata::default()
        }
    }
}
