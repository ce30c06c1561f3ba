//! ISO BMFF box navigation for iTunes-style item tags.
//!
//! mp4parse covers tracks and timing but not `moov/udta/meta/ilst`, which is
//! where encoders put title, artist and genre.

use std::io::{self, Read, Seek, SeekFrom};

/// `©nam`
pub const TITLE: [u8; 4] = [0xA9, b'n', b'a', b'm'];
/// `©ART`
pub const ARTIST: [u8; 4] = [0xA9, b'A', b'R', b'T'];
/// `©gen`
pub const GENRE: [u8; 4] = [0xA9, b'g', b'e', b'n'];

/// Well-known `data` type for UTF-8 text.
const DATA_TYPE_UTF8: u32 = 1;

/// Tag values larger than this are ignored.
const MAX_TAG_LEN: u64 = 64 * 1024;

/// A parsed box header.
#[derive(Debug, Clone)]
pub struct BoxHeader {
    /// 4-byte box type (e.g. b"moov").
    pub box_type: [u8; 4],
    /// Total size of the box including the header.
    pub size: u64,
    /// Size of the header itself (8 or 16 for extended-size boxes).
    pub header_size: u64,
}

impl BoxHeader {
    /// Size of the box content (size - header_size).
    pub fn content_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size)
    }
}

/// Text tags found in an `ilst` box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}

/// Read a box header from the current position.
///
/// Returns `Ok(None)` at EOF. A size of 0 ("extends to end of file") is
/// returned as-is; [`find_child_box`] resolves it against the parent.
pub fn read_box_header<R: Read>(reader: &mut R) -> io::Result<Option<BoxHeader>> {
    let mut buf = [0u8; 8];
    match reader.read_exact(&mut buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let size32 = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let box_type = [buf[4], buf[5], buf[6], buf[7]];

    let (size, header_size) = if size32 == 1 {
        (read_u64(reader)?, 16u64)
    } else {
        (u64::from(size32), 8u64)
    };

    Ok(Some(BoxHeader {
        box_type,
        size,
        header_size,
    }))
}

/// Search for a child box of type `target` within `parent_content_size`
/// bytes of the current position.
///
/// If found, the reader is left at the start of the child's content.
pub fn find_child_box<R: Read + Seek>(
    reader: &mut R,
    parent_content_size: u64,
    target: &[u8; 4],
) -> io::Result<Option<BoxHeader>> {
    let start = reader.stream_position()?;
    let end = start.saturating_add(parent_content_size);

    loop {
        let box_start = reader.stream_position()?;
        if box_start >= end {
            return Ok(None);
        }
        let Some(mut header) = read_box_header(reader)? else {
            return Ok(None);
        };
        if header.size == 0 {
            header.size = end - box_start;
        }
        if header.size < header.header_size {
            return Ok(None);
        }
        if &header.box_type == target {
            return Ok(Some(header));
        }
        reader.seek(SeekFrom::Start(box_start.saturating_add(header.size)))?;
    }
}

/// Read a big-endian u32.
pub fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a big-endian u64.
pub fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

/// Read a fullbox header (1 byte version + 3 bytes flags) and return (version, flags).
pub fn read_fullbox_header<R: Read>(reader: &mut R) -> io::Result<(u8, u32)> {
    let val = read_u32(reader)?;
    Ok(((val >> 24) as u8, val & 0x00FF_FFFF))
}

/// Read the item tags of a whole MP4 stream.
///
/// Returns `Ok(None)` when there is no top-level `moov` box, i.e. the
/// stream does not look like an MP4 at all. A `moov` without tags yields
/// empty [`ItemTags`].
pub fn read_item_tags<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ItemTags>> {
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let Some(moov) = find_child_box(reader, end, b"moov")? else {
        return Ok(None);
    };
    let mut tags = ItemTags::default();

    let Some(udta) = find_child_box(reader, moov.content_size(), b"udta")? else {
        return Ok(Some(tags));
    };
    let Some(meta) = find_child_box(reader, udta.content_size(), b"meta")? else {
        return Ok(Some(tags));
    };

    // ISO `meta` is a full box; QuickTime writes its children directly.
    let mut remaining = meta.content_size();
    if !starts_with_handler(reader)? {
        read_fullbox_header(reader)?;
        remaining = remaining.saturating_sub(4);
    }

    let Some(ilst) = find_child_box(reader, remaining, b"ilst")? else {
        return Ok(Some(tags));
    };

    let ilst_end = reader.stream_position()? + ilst.content_size();
    loop {
        let item_start = reader.stream_position()?;
        if item_start >= ilst_end {
            break;
        }
        let Some(item) = read_box_header(reader)? else {
            break;
        };
        if item.size < item.header_size {
            break;
        }

        let slot = match item.box_type {
            TITLE => Some(&mut tags.title),
            ARTIST => Some(&mut tags.artist),
            GENRE => Some(&mut tags.genre),
            _ => None,
        };
        if let Some(slot) = slot {
            if let Some(text) = read_data_text(reader, item.content_size())? {
                *slot = Some(text);
            }
        }

        reader.seek(SeekFrom::Start(item_start.saturating_add(item.size)))?;
    }

    Ok(Some(tags))
}

fn starts_with_handler<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let pos = reader.stream_position()?;
    let mut buf = [0u8; 8];
    let found = match reader.read_exact(&mut buf) {
        Ok(()) => &buf[4..8] == b"hdlr",
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e),
    };
    reader.seek(SeekFrom::Start(pos))?;
    Ok(found)
}

/// Read the UTF-8 payload of the `data` box inside an item.
fn read_data_text<R: Read + Seek>(reader: &mut R, item_size: u64) -> io::Result<Option<String>> {
    let Some(data) = find_child_box(reader, item_size, b"data")? else {
        return Ok(None);
    };
    let content = data.content_size();
    if content < 8 {
        return Ok(None);
    }

    let (_, data_type) = read_fullbox_header(reader)?;
    let _locale = read_u32(reader)?;
    let len = content - 8;
    if data_type != DATA_TYPE_UTF8 || len > MAX_TAG_LEN {
        return Ok(None);
    }

    let mut value = vec![0u8; len as usize];
    reader.read_exact(&mut value)?;
    Ok(Some(String::from_utf8_lossy(&value).into_owned()))
}
