//! # bmpinspect
//!
//! Structural inspector for Windows and OS/2 BMP files.
//!
//! Rather than producing a pixel buffer, an inspection walks the file and
//! reports what is actually in it: every header field with its offset, the
//! color table, the pixel data as rows or RLE codes, the color profile, and
//! any bytes nothing refers to. Problems that a lenient decoder would paper
//! over are reported as [`Warning`]s; problems that make the rest of the file
//! unreadable stop the walk with an [`InspectError`].
//!
//! ## Supported Variants
//!
//! - OS/2 1.x and Windows 2.x (12-byte core headers)
//! - OS/2 2.x (16 to 64-byte headers, including truncated ones)
//! - Windows 3.x, the 52/56-byte transitional headers, v4 and v5
//! - Uncompressed 1/2/4/8/16/24/32-bit data, RLE4, RLE8 and OS/2 RLE24
//!
//! JPEG, PNG and Huffman 1D payloads are located but not decoded.
//!
//! ## Usage
//!
//! ```no_run
//! use bmpinspect::{InspectRequest, Unstoppable};
//!
//! let data: &[u8] = &[]; // your BMP bytes
//!
//! let report = bmpinspect::inspect(data, Unstoppable)?;
//! println!("{:?}", report.variant_name);
//! for w in report.warnings() {
//!     println!("Warning: {w}");
//! }
//!
//! // Keep the partial report when the walk fails, and skip pixel decoding.
//! let partial = InspectRequest::new(data)
//!     .decode_pixels(false)
//!     .inspect_partial(Unstoppable);
//! print!("{}", bmpinspect::trace::Trace(&partial));
//! # Ok::<(), bmpinspect::InspectError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod limits;
mod report;
mod request;

pub mod bmp;
pub mod trace;

// Re-exports
pub use bmp::HeaderVariant;
pub use enough::{Stop, Unstoppable};
pub use error::{InspectError, Region};
pub use limits::{Limits, MAX_PALETTE_ENTRIES, MAX_ROW_STRIDE};
pub use report::*;
pub use request::InspectRequest;

/// Inspect a complete BMP file with default limits.
pub fn inspect(data: &[u8], stop: impl Stop) -> Result<Inspection, InspectError> {
    InspectRequest::new(data).inspect(stop)
}
