//! IFF container walking.
//!
//! An ILBM picture is a FORM outer chunk whose payload starts with the
//! "ILBM" sub-type tag followed by inner chunks: 4-byte identifier,
//! 4-byte big-endian length, payload, and one pad byte when the payload
//! length is odd (chunks start on even offsets). The declared FORM size
//! may be smaller than the buffer (the format allows appended data) but
//! never larger.

use core::fmt;

use crate::error::IlbmError;
use crate::header::{self, BitmapHeader, DisplayMode};
use crate::limits::Limits;
use crate::palette::{self, Palette};
use crate::reader::Cursor;
use crate::sink::{Diagnostics, PixelSink};

/// Four-byte chunk identifier.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const FORM: ChunkId = ChunkId(*b"FORM");
    pub const ILBM: ChunkId = ChunkId(*b"ILBM");
    pub const BMHD: ChunkId = ChunkId(*b"BMHD");
    pub const CMAP: ChunkId = ChunkId(*b"CMAP");
    pub const CAMG: ChunkId = ChunkId(*b"CAMG");
    pub const BODY: ChunkId = ChunkId(*b"BODY");
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({self})")
    }
}

/// Everything the scanline decoder needs, produced by a full walk of the
/// container. The walk finishes before any pixel row is decoded.
pub(crate) struct ParsedImage<'a> {
    pub header: BitmapHeader,
    pub palette: Palette,
    pub mode: Option<DisplayMode>,
    pub body: &'a [u8],
}

/// Verify the FORM/ILBM framing and return the chunk area's end offset.
fn verify_form(data: &[u8]) -> Result<usize, IlbmError> {
    let mut c = Cursor::new(data);
    let mut tag = [0u8; 4];
    c.read_exact_bytes(&mut tag)?;
    if ChunkId(tag) != ChunkId::FORM {
        return Err(IlbmError::NotIff);
    }

    let declared = c.get_u32_be()?;
    let end = (declared as usize)
        .checked_add(8)
        .filter(|&end| end <= data.len())
        .ok_or(IlbmError::ContainerTooShort {
            declared,
            actual: data.len(),
        })?;

    c.read_exact_bytes(&mut tag)?;
    if ChunkId(tag) != ChunkId::ILBM {
        return Err(IlbmError::NotIlbm);
    }

    Ok(end)
}

/// Walk the container, dispatching each recognized chunk to its decoder
/// and skipping the rest with a warning.
///
/// Ordering is enforced here: BMHD before CMAP/CAMG/BODY, CMAP before
/// BODY. The pixel sink is allocated exactly once, as soon as the header
/// has parsed and passed the limit checks.
pub(crate) fn parse_container<'d>(
    data: &'d [u8],
    limits: Option<&Limits>,
    sink: &mut dyn PixelSink,
    diag: &dyn Diagnostics,
) -> Result<ParsedImage<'d>, IlbmError> {
    let end = verify_form(data)?;

    let mut header: Option<BitmapHeader> = None;
    let mut palette: Option<Palette> = None;
    let mut mode: Option<DisplayMode> = None;
    let mut body: Option<&'d [u8]> = None;

    let mut pos = 12usize;
    while pos < end {
        if pos + 8 > end {
            return Err(IlbmError::InvalidData(alloc::format!(
                "truncated chunk header at offset {pos}"
            )));
        }
        let id = ChunkId([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        let len = u32::from_be_bytes([
            data[pos + 4],
            data[pos + 5],
            data[pos + 6],
            data[pos + 7],
        ]) as usize;

        let payload_start = pos + 8;
        let payload_end = payload_start
            .checked_add(len)
            .ok_or(IlbmError::UnexpectedEof)?;
        if payload_end > end {
            return Err(IlbmError::TruncatedChunk {
                id,
                offset: pos,
                needed: len,
                available: end - payload_start,
            });
        }
        let payload = &data[payload_start..payload_end];

        match &id.0 {
            b"BMHD" => {
                if header.is_some() {
                    return Err(IlbmError::DuplicateHeader);
                }
                let h = header::parse_bmhd(payload, diag)?;
                let (w, hgt) = (u32::from(h.width), u32::from(h.height));
                if let Some(limits) = limits {
                    limits.check(w, hgt)?;
                }
                let out_bytes = (w as usize)
                    .checked_mul(hgt as usize)
                    .and_then(|px| px.checked_mul(4))
                    .ok_or(IlbmError::DimensionsTooLarge { width: w, height: hgt })?;
                if let Some(limits) = limits {
                    limits.check_memory(out_bytes)?;
                }
                sink.allocate(w, hgt);
                header = Some(h);
            }
            b"CMAP" => {
                let h = header
                    .as_ref()
                    .ok_or(IlbmError::ChunkBeforeHeader { id })?;
                if palette.is_some() {
                    diag.warn(format_args!("duplicate CMAP chunk, replacing palette"));
                }
                palette = Some(palette::parse_cmap(payload, h, diag)?);
            }
            b"CAMG" => {
                if header.is_none() {
                    return Err(IlbmError::ChunkBeforeHeader { id });
                }
                mode = Some(header::parse_camg(payload, diag)?);
            }
            b"BODY" => {
                if header.is_none() {
                    return Err(IlbmError::ChunkBeforeHeader { id });
                }
                if palette.is_none() {
                    return Err(IlbmError::BodyBeforePalette);
                }
                if body.is_some() {
                    diag.warn(format_args!("duplicate BODY chunk ignored"));
                } else {
                    body = Some(payload);
                }
            }
            _ => diag.warn(format_args!("skipping unrecognised chunk: {id}")),
        }

        pos = payload_end;
        pos += pos % 2; // pad to even offset
    }

    let header = header.ok_or(IlbmError::MissingChunk { id: ChunkId::BMHD })?;
    let palette = palette.ok_or(IlbmError::MissingChunk { id: ChunkId::CMAP })?;
    let body = body.ok_or(IlbmError::MissingChunk { id: ChunkId::BODY })?;

    Ok(ParsedImage {
        header,
        palette,
        mode,
        body,
    })
}

/// Parse only as far as the BMHD chunk and return the descriptor.
///
/// The header-only fast path for probing dimensions without decoding:
/// no palette or pixel data is required, unrecognized chunks ahead of
/// the header are skipped silently.
pub fn probe(data: &[u8]) -> Result<BitmapHeader, IlbmError> {
    let end = verify_form(data)?;

    let mut pos = 12usize;
    while pos < end {
        if pos + 8 > end {
            return Err(IlbmError::InvalidData(alloc::format!(
                "truncated chunk header at offset {pos}"
            )));
        }
        let id = ChunkId([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        let len = u32::from_be_bytes([
            data[pos + 4],
            data[pos + 5],
            data[pos + 6],
            data[pos + 7],
        ]) as usize;

        let payload_start = pos + 8;
        let payload_end = payload_start
            .checked_add(len)
            .ok_or(IlbmError::UnexpectedEof)?;
        if payload_end > end {
            return Err(IlbmError::TruncatedChunk {
                id,
                offset: pos,
                needed: len,
                available: end - payload_start,
            });
        }

        match &id.0 {
            b"BMHD" => {
                return header::parse_bmhd(
                    &data[payload_start..payload_end],
                    &crate::sink::NULL_DIAGNOSTICS,
                );
            }
            b"CMAP" | b"CAMG" | b"BODY" => {
                return Err(IlbmError::ChunkBeforeHeader { id });
            }
            _ => {}
        }

        pos = payload_end;
        pos += pos % 2;
    }

    Err(IlbmError::MissingChunk { id: ChunkId::BMHD })
}
