//! sg-media: byte-level access to stored media.
//!
//! - [`range`] turns an HTTP `Range` header into a concrete byte window or
//!   rejects it. Out-of-bounds requests are errors, never clamped.
//! - [`store`] is the storage collaborator: listing resources, locating one
//!   by id, and opening a bounded reader over a window of its bytes.
//! - [`content_type`] maps file extensions to MIME types.

pub mod content_type;
pub mod range;
pub mod store;

pub use content_type::guess_content_type;
pub use range::{resolve_range, ByteWindow, RangeError, ResolvedRange};
pub use store::{FsStore, MediaResource, MediaStore, WindowReader};
