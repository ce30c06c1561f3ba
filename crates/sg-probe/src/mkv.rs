//! Matroska/WebM probing via the `matroska` crate.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use sg_core::Error;

use crate::metadata::MediaMetadata;
use crate::prober::{extension, Prober};

/// Prober for Matroska and WebM files. Only the segment title, duration and
/// first video track dimensions are read; author and topic stay unknown.
#[derive(Debug, Default)]
pub struct MkvProber;

impl MkvProber {
    pub fn new() -> Self {
        Self
    }
}

impl Prober for MkvProber {
    fn name(&self) -> &'static str {
        "mkv"
    }

    fn supports(&self, path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("mkv" | "webm"))
    }

    fn probe(&self, path: &Path) -> sg_core::Result<MediaMetadata> {
        let file = File::open(path).map_err(|e| Error::Probe(e.to_string()))?;
        let mkv = matroska::Matroska::open(BufReader::new(file))
            .map_err(|e| Error::Probe(format!("MKV parse error: {e}")))?;

        let mut metadata = MediaMetadata::default();
        metadata.set_title(mkv.info.title.clone());
        if let Some(duration) = mkv.info.duration {
            metadata.set_duration(duration.as_secs_f64());
        }

        let dimensions = mkv.tracks.iter().find_map(|track| match &track.settings {
            matroska::Settings::Video(video) => {
                Some((video.pixel_width as u64, video.pixel_height as u64))
            }
            _ => None,
        });
        if let Some((w, h)) = dimensions {
            metadata.set_dimensions(w, h);
        }

        Ok(metadata)
    }
}
