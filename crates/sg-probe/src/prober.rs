//! The [`Prober`] trait.

use std::path::Path;

use crate::metadata::MediaMetadata;

/// Extracts descriptive metadata from a media file.
///
/// Probing does blocking file I/O; async callers should run it on a
/// blocking thread.
pub trait Prober: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Probe the file at `path`.
    fn probe(&self, path: &Path) -> sg_core::Result<MediaMetadata>;

    /// Whether this prober handles `path`, judged by extension.
    fn supports(&self, path: &Path) -> bool;
}

/// Lower-cased extension of `path`, if any.
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
