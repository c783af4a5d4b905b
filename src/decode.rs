//! Decode entry points and the pull-driven scanline state machine.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::container::{self, ParsedImage};
use crate::error::IlbmError;
use crate::header::{BitmapHeader, Compression, DisplayMode, Masking};
use crate::limits::Limits;
use crate::packbits;
use crate::palette::Palette;
use crate::planar;
use crate::reader::Cursor;
use crate::sink::{Diagnostics, PixelSink, RgbaRaster, NULL_DIAGNOSTICS};

/// Decode a whole ILBM image into an owned RGBA8 buffer.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, IlbmError> {
    DecodeRequest::new(data).decode(stop)
}

/// Builder for a decode: input bytes plus optional limits and diagnostics.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            diagnostics: &NULL_DIAGNOSTICS,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Parse the container and return a session ready to decode rows.
    ///
    /// The whole chunk walk runs here: header, palette, and mode chunks
    /// are parsed, `sink.allocate` is called, and every fatal container
    /// condition has already surfaced. What remains is pulling rows with
    /// [`DecodeSession::decode_next_row`], which the caller may interleave
    /// with other work.
    pub fn begin<'s>(
        self,
        sink: &'s mut dyn PixelSink,
        stop: &dyn Stop,
    ) -> Result<DecodeSession<'a, 's>, IlbmError> {
        stop.check()?;
        let ParsedImage {
            header,
            palette,
            mode,
            body,
        } = container::parse_container(self.data, self.limits, sink, self.diagnostics)?;

        let scanline_len = header.row_bytes * header.effective_planes();
        let width = usize::from(header.width);

        Ok(DecodeSession {
            header,
            palette,
            mode,
            body: Cursor::new(body),
            sink,
            scanline: vec![0u8; scanline_len],
            indices: vec![0u16; width],
            rgba: vec![0u8; width * 4],
            row: 0,
        })
    }

    /// Decode every row into an internal raster and return it.
    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, IlbmError> {
        let mut raster = RgbaRaster::new();
        {
            let mut session = self.begin(&mut raster, &stop)?;
            let mut rows = 0u32;
            while session.decode_next_row()? {
                rows += 1;
                if rows % 16 == 0 {
                    stop.check()?;
                }
            }
        }
        let (pixels, width, height) = raster.into_parts();
        Ok(DecodeOutput {
            pixels,
            width,
            height,
        })
    }
}

/// In-progress decode: cursor state over the BODY chunk plus the scratch
/// buffers one scanline needs.
///
/// Produced by [`DecodeRequest::begin`] once the container has fully
/// parsed; each [`decode_next_row`](Self::decode_next_row) call emits one
/// row to the pixel sink. Dropping the session at any point is the only
/// teardown.
pub struct DecodeSession<'a, 's> {
    header: BitmapHeader,
    palette: Palette,
    mode: Option<DisplayMode>,
    body: Cursor<'a>,
    sink: &'s mut dyn PixelSink,
    /// One decompressed scanline: `row_bytes` bytes per effective plane.
    scanline: Vec<u8>,
    /// Per-column palette index accumulator, cleared as rows are resolved.
    indices: Vec<u16>,
    /// Reused RGBA row handed to the sink.
    rgba: Vec<u8>,
    row: u32,
}

impl DecodeSession<'_, '_> {
    pub fn header(&self) -> &BitmapHeader {
        &self.header
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.mode
    }

    pub fn width(&self) -> u32 {
        u32::from(self.header.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.header.height)
    }

    /// Rows emitted so far.
    pub fn rows_decoded(&self) -> u32 {
        self.row
    }

    /// Decompress, deinterleave, resolve, and emit the next scanline.
    ///
    /// Returns `Ok(true)` while rows remain and `Ok(false)` once all
    /// `height` rows have been produced. Any error is fatal for the
    /// session.
    pub fn decode_next_row(&mut self) -> Result<bool, IlbmError> {
        if self.row >= u32::from(self.header.height) {
            return Ok(false);
        }

        match self.header.compression {
            Compression::ByteRun1 => packbits::unpack(&mut self.body, &mut self.scanline)?,
            Compression::None => self.body.read_exact_bytes(&mut self.scanline)?,
        }

        planar::deinterleave_row(
            &self.scanline,
            self.header.row_bytes,
            self.header.effective_planes(),
            &mut self.indices,
        );

        let mask_bit = 1u16 << self.header.bitplanes;
        for (col, rgba) in self.indices.iter_mut().zip(self.rgba.chunks_exact_mut(4)) {
            let mut index = *col;
            *col = 0; // accumulator is reused across rows

            let transparent = match self.header.masking {
                Masking::MaskPlane => {
                    if index == mask_bit {
                        // only the mask bit set: no color, fully transparent
                        true
                    } else {
                        index &= !mask_bit;
                        false
                    }
                }
                Masking::ColorKey(key) => index == key,
                Masking::None => false,
            };

            if transparent {
                rgba.fill(0);
            } else {
                let entry = self.palette.color(index);
                rgba[0] = entry.red;
                rgba[1] = entry.green;
                rgba[2] = entry.blue;
                rgba[3] = 255;
            }
        }

        self.sink.write_row(self.row, &self.rgba);
        self.row += 1;
        Ok(true)
    }
}

/// Decoded image output: an owned, row-major RGBA8 buffer.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodeOutput {
    /// Access the pixel data, `width * height * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// View the pixel data as typed RGBA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_rgba(&self) -> &[rgb::RGBA8] {
        self.pixels.as_pixels()
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of RGBA pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::RGBA8> {
        imgref::ImgRef::new(self.as_rgba(), self.width as usize, self.height as usize)
    }

    /// Convert to an [`imgref::ImgVec`] of RGBA pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGBA8> {
        imgref::ImgVec::new(
            self.as_rgba().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}
