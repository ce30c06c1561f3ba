//! Descriptive metadata attached to listed resources.

use serde::Serialize;

/// Placeholder for any text field that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// What the listing endpoint shows about a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaMetadata {
    pub title: String,
    pub author: String,
    pub topic: String,
    /// Duration in seconds, `0` when unknown.
    pub duration: f64,
    /// `"<width>x<height>"` of the first video track.
    pub resolution: String,
}

impl Default for MediaMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN.into(),
            author: UNKNOWN.into(),
            topic: UNKNOWN.into(),
            duration: 0.0,
            resolution: UNKNOWN.into(),
        }
    }
}

impl MediaMetadata {
    pub(crate) fn set_title(&mut self, value: Option<String>) {
        if let Some(v) = non_blank(value) {
            self.title = v;
        }
    }

    pub(crate) fn set_author(&mut self, value: Option<String>) {
        if let Some(v) = non_blank(value) {
            self.author = v;
        }
    }

    pub(crate) fn set_topic(&mut self, value: Option<String>) {
        if let Some(v) = non_blank(value) {
            self.topic = v;
        }
    }

    pub(crate) fn set_dimensions(&mut self, width: u64, height: u64) {
        if width > 0 && height > 0 {
            self.resolution = format!("{width}x{height}");
        }
    }

    pub(crate) fn set_duration(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.duration = secs;
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
