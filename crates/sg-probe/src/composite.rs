//! A prober that delegates to several [`Prober`] implementations.

use std::path::Path;

use crate::metadata::MediaMetadata;
use crate::prober::Prober;

/// Tries each registered [`Prober`] that supports the file, in order, and
/// returns the first success.
pub struct CompositeProber {
    probers: Vec<Box<dyn Prober>>,
}

impl CompositeProber {
    pub fn new(probers: Vec<Box<dyn Prober>>) -> Self {
        Self { probers }
    }
}

impl Prober for CompositeProber {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn supports(&self, path: &Path) -> bool {
        self.probers.iter().any(|p| p.supports(path))
    }

    fn probe(&self, path: &Path) -> sg_core::Result<MediaMetadata> {
        let mut last_err = None;

        for prober in &self.probers {
            if !prober.supports(path) {
                continue;
            }

            match prober.probe(path) {
                Ok(metadata) => return Ok(metadata),
                Err(e) => {
                    tracing::debug!(
                        prober = prober.name(),
                        error = %e,
                        "prober failed, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            sg_core::Error::Probe(format!("no prober supports file: {}", path.display()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MkvProber, Mp4Prober};

    struct Fixed(&'static str);

    impl Prober for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn supports(&self, _path: &Path) -> bool {
            true
        }

        fn probe(&self, _path: &Path) -> sg_core::Result<MediaMetadata> {
            let mut m = MediaMetadata::default();
            m.set_title(Some(self.0.to_string()));
            Ok(m)
        }
    }

    #[test]
    fn supports_delegates() {
        let composite =
            CompositeProber::new(vec![Box::new(Mp4Prober::new()), Box::new(MkvProber::new())]);
        assert!(composite.supports(Path::new("movie.mkv")));
        assert!(composite.supports(Path::new("movie.mp4")));
        assert!(!composite.supports(Path::new("movie.avi")));
    }

    #[test]
    fn no_probers_is_an_error() {
        let composite = CompositeProber::new(vec![]);
        assert!(composite.probe(Path::new("movie.mkv")).is_err());
    }

    #[test]
    fn falls_through_to_next_prober() {
        let composite =
            CompositeProber::new(vec![Box::new(Mp4Prober::new()), Box::new(Fixed("fallback"))]);
        let metadata = composite.probe(Path::new("/missing/movie.mp4")).unwrap();
        assert_eq!(metadata.title, "fallback");
    }
}
