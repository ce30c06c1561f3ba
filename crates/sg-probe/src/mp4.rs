//! MP4 probing: timing and dimensions through `mp4parse`, text tags through
//! the [`atoms`](crate::atoms) walker.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use sg_core::Error;

use crate::atoms::{self, ItemTags};
use crate::metadata::MediaMetadata;
use crate::prober::{extension, Prober};

/// Prober for MP4-family containers.
#[derive(Debug, Default)]
pub struct Mp4Prober;

impl Mp4Prober {
    pub fn new() -> Self {
        Self
    }
}

impl Prober for Mp4Prober {
    fn name(&self) -> &'static str {
        "mp4"
    }

    fn supports(&self, path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("mp4" | "m4v" | "mov"))
    }

    fn probe(&self, path: &Path) -> sg_core::Result<MediaMetadata> {
        let context = parse_context(path);
        let tags = read_tags(path);

        if let (Err(parse_err), None) = (&context, &tags) {
            return Err(Error::Probe(format!(
                "{}: {parse_err}",
                path.display()
            )));
        }

        let mut metadata = MediaMetadata::default();

        match context {
            Ok(context) => {
                if let Some(secs) = duration_secs(&context) {
                    metadata.set_duration(secs);
                }
                if let Some((w, h)) = video_dimensions(&context) {
                    metadata.set_dimensions(w, h);
                }
            }
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "mp4parse failed; using tags only"
                );
            }
        }

        if let Some(tags) = tags {
            metadata.set_title(tags.title);
            metadata.set_author(tags.artist);
            metadata.set_topic(tags.genre);
        }

        Ok(metadata)
    }
}

fn parse_context(path: &Path) -> sg_core::Result<mp4parse::MediaContext> {
    let file = File::open(path).map_err(|e| Error::Probe(e.to_string()))?;
    let mut reader = BufReader::new(file);
    mp4parse::read_mp4(&mut reader).map_err(|e| Error::Probe(format!("MP4 parse error: {e:?}")))
}

/// `None` when the file has no `moov` box or cannot be read.
fn read_tags(path: &Path) -> Option<ItemTags> {
    let file = File::open(path).ok()?;
    match atoms::read_item_tags(&mut BufReader::new(file)) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "failed to read item tags");
            None
        }
    }
}

/// Longest track duration in seconds.
fn duration_secs(context: &mp4parse::MediaContext) -> Option<f64> {
    let global = context.timescale.map(|t| t.0);
    context
        .tracks
        .iter()
        .filter_map(|t| {
            let dur = t.duration?.0;
            let scale = t.timescale.map(|s| s.0).or(global)?;
            (scale > 0).then(|| dur as f64 / scale as f64)
        })
        .reduce(f64::max)
}

fn video_dimensions(context: &mp4parse::MediaContext) -> Option<(u64, u64)> {
    context
        .tracks
        .iter()
        .filter(|t| matches!(t.track_type, mp4parse::TrackType::Video))
        .find_map(|t| match t.stsd.as_ref()?.descriptions.first()? {
            mp4parse::SampleEntry::Video(ve) => Some((u64::from(ve.width), u64::from(ve.height))),
            _ => None,
        })
}
