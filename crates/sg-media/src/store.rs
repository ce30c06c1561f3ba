//! Media storage.

use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

use sg_core::config::StoreConfig;
use sg_core::{Error, ResourceId, Result};

use crate::content_type::guess_content_type;

/// A reader that yields exactly the bytes of one window, then EOF.
pub type WindowReader = Pin<Box<dyn AsyncRead + Send>>;

/// A streamable resource as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResource {
    pub id: ResourceId,
    pub location: PathBuf,
    /// Total size in bytes.
    pub size: u64,
    pub content_type: &'static str,
}

/// Storage collaborator for the streaming server.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// All streamable resources, ordered by id.
    async fn list(&self) -> Result<Vec<MediaResource>>;

    /// Find a resource by id. `Error::NotFound` when it does not exist.
    async fn locate(&self, id: &ResourceId) -> Result<MediaResource>;

    /// Open a reader over `len` bytes starting at `offset`.
    async fn open_window(
        &self,
        resource: &MediaResource,
        offset: u64,
        len: u64,
    ) -> Result<WindowReader>;
}

/// A flat directory of files named `<id>.<ext>`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FsStore {
    /// Extensions are matched exactly, without the leading dot. Earlier
    /// entries win when two files share a stem.
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            root: root.into(),
            extensions,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        let root = shellexpand::tilde(&config.root.to_string_lossy()).into_owned();
        Self::new(root, config.extensions.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn extension_rank(&self, path: &Path) -> Option<usize> {
        let ext = path.extension()?.to_str()?;
        self.extensions.iter().position(|e| e == ext)
    }
}

#[async_trait]
impl MediaStore for FsStore {
    async fn list(&self) -> Result<Vec<MediaResource>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut found: BTreeMap<ResourceId, (usize, MediaResource)> = BTreeMap::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(rank) = self.extension_rank(&path) else {
                continue;
            };

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", path.display());
                    continue;
                }
            };

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = match ResourceId::parse(stem) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", path.display());
                    continue;
                }
            };

            let resource = MediaResource {
                id: id.clone(),
                content_type: guess_content_type(&path),
                location: path,
                size: metadata.len(),
            };

            match found.get(&id) {
                Some((existing, _)) if *existing <= rank => {}
                _ => {
                    found.insert(id, (rank, resource));
                }
            }
        }

        Ok(found.into_values().map(|(_, r)| r).collect())
    }

    async fn locate(&self, id: &ResourceId) -> Result<MediaResource> {
        for ext in &self.extensions {
            let path = self.root.join(format!("{id}.{ext}"));
            match tokio::fs::metadata(&path).await {
                Ok(m) if m.is_file() => {
                    return Ok(MediaResource {
                        id: id.clone(),
                        content_type: guess_content_type(&path),
                        location: path,
                        size: m.len(),
                    });
                }
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::not_found("resource", id))
    }

    async fn open_window(
        &self,
        resource: &MediaResource,
        offset: u64,
        len: u64,
    ) -> Result<WindowReader> {
        let mut file = match tokio::fs::File::open(&resource.location).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found("resource", &resource.id));
            }
            Err(e) => return Err(e.into()),
        };
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::pin(file.take(len)))
    }
}
