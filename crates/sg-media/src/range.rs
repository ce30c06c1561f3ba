//! HTTP `Range` resolution.
//!
//! Accepts a single `bytes=<start>-[<end>]` range. `start` is mandatory,
//! `end` defaults to the last byte. Anything that is not two runs of ASCII
//! digits around a `-` is malformed (400); anything outside
//! `0 <= start <= end < total_size` is unsatisfiable (416).

use std::fmt;

/// An inclusive byte window inside a resource of `total_size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ByteWindow {
    /// Number of bytes in the window.
    pub fn chunk_size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` response header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Outcome of resolving a request against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// No `Range` header: the whole resource, answered with 200.
    Full { total_size: u64 },
    /// A satisfiable range, answered with 206.
    Partial(ByteWindow),
}

impl ResolvedRange {
    /// First byte to read.
    pub fn offset(&self) -> u64 {
        match self {
            ResolvedRange::Full { .. } => 0,
            ResolvedRange::Partial(w) => w.start,
        }
    }

    /// Number of bytes to transfer (the `Content-Length`).
    pub fn len(&self) -> u64 {
        match self {
            ResolvedRange::Full { total_size } => *total_size,
            ResolvedRange::Partial(w) => w.chunk_size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_size(&self) -> u64 {
        match self {
            ResolvedRange::Full { total_size } => *total_size,
            ResolvedRange::Partial(w) => w.total_size,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ResolvedRange::Partial(_))
    }
}

/// Why a `Range` header was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The header is not a single well-formed byte range.
    #[error("{0}")]
    Malformed(String),
    /// The range does not fit inside the resource.
    #[error("range not satisfiable for {size} bytes")]
    Unsatisfiable { size: u64 },
}

impl From<RangeError> for sg_core::Error {
    fn from(e: RangeError) -> Self {
        match e {
            RangeError::Malformed(reason) => sg_core::Error::MalformedRange(reason),
            RangeError::Unsatisfiable { size } => sg_core::Error::UnsatisfiableRange { size },
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bound::Start => "start",
            Bound::End => "end",
        })
    }
}

/// Resolve an optional `Range` header value against a resource size.
pub fn resolve_range(header: Option<&str>, total_size: u64) -> Result<ResolvedRange, RangeError> {
    let Some(raw) = header else {
        return Ok(ResolvedRange::Full { total_size });
    };

    let raw = raw.trim();
    let set = match raw.get(..6) {
        Some(unit) if unit.eq_ignore_ascii_case("bytes=") => &raw[6..],
        _ => return Err(RangeError::Malformed("expected a `bytes=` range".into())),
    };

    if set.contains(',') {
        return Err(RangeError::Malformed(
            "multiple ranges are not supported".into(),
        ));
    }

    let (start, end) = set
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed("missing `-` in range".into()))?;

    let start = parse_position(start.trim(), Bound::Start)?;
    let end = match end.trim() {
        "" => None,
        digits => Some(parse_position(digits, Bound::End)?),
    };

    if start >= total_size {
        return Err(RangeError::Unsatisfiable { size: total_size });
    }
    let end = end.unwrap_or(total_size - 1);
    if start > end || end >= total_size {
        return Err(RangeError::Unsatisfiable { size: total_size });
    }

    Ok(ResolvedRange::Partial(ByteWindow {
        start,
        end,
        total_size,
    }))
}

fn parse_position(s: &str, bound: Bound) -> Result<u64, RangeError> {
    if s.is_empty() {
        return Err(RangeError::Malformed(format!("range {bound} is required")));
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(format!(
            "range {bound} {s:?} is not a non-negative integer"
        )));
    }
    s.parse()
        .map_err(|_| RangeError::Malformed(format!("range {bound} {s:?} is too large")))
}
