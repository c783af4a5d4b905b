//! # zenilbm
//!
//! IFF/ILBM (Amiga interleaved bitmap) image decoder.
//!
//! ## Scanline-at-a-Time Decoding
//!
//! The container parse runs to completion up front; after that, each call
//! to [`DecodeSession::decode_next_row`] is one bounded unit of work that
//! emits one RGBA row to a caller-supplied [`PixelSink`]. A host can
//! interleave row decoding with other work so a tall image never
//! monopolizes a single-threaded event loop. The whole-image convenience
//! path ([`decode`]) drives the same loop into an in-memory raster.
//!
//! ## Supported
//!
//! - 1–8 bitplanes with a CMAP palette
//! - Uncompressed and ByteRun1 (PackBits) compressed BODY data
//! - Mask-plane and transparent-color (color-key) transparency
//! - CAMG display-mode chunk (HIRES/LACE flags are informational)
//!
//! ## Non-Goals
//!
//! - HAM (hold-and-modify) color reconstruction: such images decode as
//!   standard planar with a warning, and colors will be wrong
//! - EHB (extra-half-brite) palette doubling (rejected outright)
//! - 24-bit truecolor planes, lasso masking, aspect-ratio correction
//! - Encoding
//!
//! ## Usage
//!
//! ```no_run
//! use zenilbm::{DecodeRequest, RgbaRaster, Unstoppable};
//!
//! let data: &[u8] = &[]; // your ILBM bytes
//!
//! // Probe without decoding
//! let info = zenilbm::probe(data)?;
//! println!("{}x{} {} planes", info.width, info.height, info.bitplanes);
//!
//! // Whole-image decode
//! let decoded = zenilbm::decode(data, Unstoppable)?;
//! // decoded.pixels() is width * height * 4 RGBA bytes
//!
//! // Or drive it row by row into your own sink
//! let mut raster = RgbaRaster::new();
//! let mut session = DecodeRequest::new(data).begin(&mut raster, &Unstoppable)?;
//! while session.decode_next_row()? {
//!     // yield to other work between rows if you like
//! }
//! # Ok::<(), zenilbm::IlbmError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod container;
mod decode;
mod error;
mod header;
mod limits;
mod packbits;
mod palette;
mod planar;
mod reader;
mod sink;

// Re-exports
pub use container::{ChunkId, probe};
pub use decode::{DecodeOutput, DecodeRequest, DecodeSession, decode};
pub use enough::{Stop, Unstoppable};
pub use error::IlbmError;
pub use header::{BitmapHeader, Compression, DisplayMode, Masking};
pub use limits::Limits;
pub use palette::{Palette, PaletteEntry};
pub use sink::{Diagnostics, NullDiagnostics, PixelSink, RgbaRaster};
