//! BMHD bitmap header and CAMG display mode parsing.

use crate::error::IlbmError;
use crate::reader::Cursor;
use crate::sink::Diagnostics;

/// Fixed BMHD payload size.
pub(crate) const BMHD_SIZE: u32 = 20;

// Masking byte values on the wire.
const MSK_NONE: u8 = 0x00;
const MSK_HAS_MASK: u8 = 0x01;
const MSK_HAS_TRANSPARENT_COLOR: u8 = 0x02;
const MSK_LASSO: u8 = 0x03;

// Compression byte values on the wire.
const CMP_NONE: u8 = 0x00;
const CMP_BYTE_RUN1: u8 = 0x01;

/// How pixel rows are stored in the BODY chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Compression {
    /// Verbatim planar rows.
    None,
    /// PackBits run-length encoding, one scanline at a time.
    ByteRun1,
}

/// How transparent pixels are marked, if at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Masking {
    /// Image is fully opaque.
    None,
    /// An extra bitplane interleaved after the color planes carries
    /// per-pixel opacity.
    MaskPlane,
    /// One palette index is reserved as fully transparent.
    ColorKey(u16),
}

/// Parsed BMHD descriptor. Immutable for the lifetime of a decode.
#[derive(Clone, Copy, Debug)]
pub struct BitmapHeader {
    pub width: u16,
    pub height: u16,
    pub bitplanes: u8,
    pub compression: Compression,
    pub masking: Masking,
    pub x_aspect: u8,
    pub y_aspect: u8,
    /// Bytes per scanline per plane, rounded up to a 16-bit boundary.
    pub row_bytes: usize,
}

impl BitmapHeader {
    /// Planes stored per scanline in the BODY: the color planes plus the
    /// mask plane when one is interleaved.
    pub fn effective_planes(&self) -> usize {
        usize::from(self.bitplanes) + usize::from(self.masking == Masking::MaskPlane)
    }

    /// Palette entries required for this bit depth.
    pub fn required_palette_entries(&self) -> usize {
        1usize << self.bitplanes
    }
}

pub(crate) fn parse_bmhd(payload: &[u8], diag: &dyn Diagnostics) -> Result<BitmapHeader, IlbmError> {
    if payload.len() as u32 != BMHD_SIZE {
        return Err(IlbmError::WrongHeaderSize {
            found: payload.len() as u32,
            expected: BMHD_SIZE,
        });
    }

    let mut c = Cursor::new(payload);
    let width = c.get_u16_be()?;
    let height = c.get_u16_be()?;
    let _left = c.get_i16_be()?;
    let _top = c.get_i16_be()?;
    let bitplanes = c.get_u8()?;
    let masking_byte = c.get_u8()?;
    let compression_byte = c.get_u8()?;
    c.skip(1)?; // pad byte
    let transparent_color = c.get_u16_be()?;
    let x_aspect = c.get_u8()?;
    let y_aspect = c.get_u8()?;
    let _page_width = c.get_u16_be()?;
    let _page_height = c.get_u16_be()?;

    if width == 0 {
        return Err(IlbmError::InvalidHeader("width is zero".into()));
    }
    if height == 0 {
        return Err(IlbmError::InvalidHeader("height is zero".into()));
    }
    if bitplanes == 0 || bitplanes > 8 {
        // 24-bit truecolor planes are out of scope
        return Err(IlbmError::UnsupportedBitplanes(bitplanes));
    }

    let compression = match compression_byte {
        CMP_NONE => Compression::None,
        CMP_BYTE_RUN1 => Compression::ByteRun1,
        other => return Err(IlbmError::UnsupportedCompression(other)),
    };

    let masking = match masking_byte {
        MSK_NONE => Masking::None,
        MSK_HAS_MASK => Masking::MaskPlane,
        MSK_HAS_TRANSPARENT_COLOR => Masking::ColorKey(transparent_color),
        MSK_LASSO => return Err(IlbmError::UnsupportedMasking),
        other => return Err(IlbmError::UnknownMasking(other)),
    };

    if x_aspect != y_aspect {
        diag.warn(format_args!(
            "aspect ratio {x_aspect}:{y_aspect} is not 1:1, image will not be scaled"
        ));
    }

    // Smallest even number of bytes covering `width` bits.
    let row_bytes = ((usize::from(width) + 15) >> 4) << 1;

    let header = BitmapHeader {
        width,
        height,
        bitplanes,
        compression,
        masking,
        x_aspect,
        y_aspect,
        row_bytes,
    };

    diag.debug(format_args!(
        "BMHD: {width}x{height}, {bitplanes} bitplanes, {compression:?}, {masking:?}, row_bytes {row_bytes}"
    ));

    Ok(header)
}

// CAMG mode flags.
const CAMG_MODE_HAM: u32 = 0x0800; // Hold And Modify
const CAMG_MODE_EHB: u32 = 0x0080; // Extra Half Brite
const CAMG_MODE_HIRES: u32 = 0x8000; // double horizontal pixels
const CAMG_MODE_LACE: u32 = 0x0004; // interlaced, double vertical pixels

/// Raw CAMG display mode word. Informational after parsing: the only
/// flag that alters decoding is EHB, which is rejected outright.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DisplayMode(u32);

impl DisplayMode {
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn hold_and_modify(self) -> bool {
        self.0 & CAMG_MODE_HAM != 0
    }

    pub fn extra_halfbrite(self) -> bool {
        self.0 & CAMG_MODE_EHB != 0
    }

    pub fn hires(self) -> bool {
        self.0 & CAMG_MODE_HIRES != 0
    }

    pub fn interlace(self) -> bool {
        self.0 & CAMG_MODE_LACE != 0
    }
}

pub(crate) fn parse_camg(payload: &[u8], diag: &dyn Diagnostics) -> Result<DisplayMode, IlbmError> {
    let camg = Cursor::new(payload).get_u32_be()?;
    diag.debug(format_args!("CAMG: {camg:#010x}"));

    if camg & CAMG_MODE_EHB != 0 {
        return Err(IlbmError::UnsupportedDisplayMode { camg });
    }

    // HAM modulates colors from a running accumulator; this decoder treats
    // the image as standard planar, so colors will be wrong.
    if camg & CAMG_MODE_HAM != 0 {
        diag.warn(format_args!(
            "hold-and-modify mode is not implemented, colors will be incorrect"
        ));
    }

    Ok(DisplayMode(camg))
}
