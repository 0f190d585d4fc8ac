//! The structured result of an inspection.
//!
//! Every section records the absolute file offset it starts at, so a caller
//! can line decoded values back up with the raw bytes.

use alloc::vec::Vec;
use core::fmt;

use rgb::RGB8;

use crate::bmp::HeaderVariant;
use crate::error::InspectError;

pub const LCS_CALIBRATED_RGB: u32 = 0;
pub const LCS_SRGB: u32 = 0x7352_4742;
pub const LCS_WINDOWS_COLOR_SPACE: u32 = 0x5769_6e20;
pub const PROFILE_LINKED: u32 = 0x4c49_4e4b;
pub const PROFILE_EMBEDDED: u32 = 0x4d42_4544;

/// Name of a `CSType` value, if it is one of the documented ones.
pub fn color_space_name(cs_type: u32) -> Option<&'static str> {
    Some(match cs_type {
        LCS_CALIBRATED_RGB => "LCS_CALIBRATED_RGB",
        1 => "LCS_DEVICE_RGB (?)",
        2 => "LCS_DEVICE_CMYK (?)",
        LCS_SRGB => "LCS_sRGB",
        LCS_WINDOWS_COLOR_SPACE => "LCS_WINDOWS_COLOR_SPACE",
        PROFILE_LINKED => "PROFILE_LINKED",
        PROFILE_EMBEDDED => "PROFILE_EMBEDDED",
        _ => return None,
    })
}

/// Name of a v5 rendering intent.
pub fn intent_name(intent: u32) -> Option<&'static str> {
    Some(match intent {
        1 => "LCS_GM_BUSINESS (Saturation)",
        2 => "LCS_GM_GRAPHICS (Relative)",
        4 => "LCS_GM_IMAGES (Perceptual)",
        8 => "LCS_GM_ABS_COLORIMETRIC",
        _ => return None,
    })
}

// ── Warnings ────────────────────────────────────────────────────────

/// A non-fatal problem. Inspection continues after recording one.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    FileSizeMismatch { reported: u32, actual: u64 },
    BadWidth,
    BadHeight,
    PlanesNotOne(u16),
    CompressedTopDown,
    MissingSizeImage,
    /// The pixel data starts inside the color table; the table was cut to
    /// `entries`.
    PaletteOverlapsBitmap { entries: usize },
    /// An OS/2 v2 color table only fits with 3-byte entries.
    ThreeBytePaletteEntries,
    InvalidColorSpace(u32),
    UnexpectedEndOfFile,
    /// First pixel whose palette index is outside the color table.
    BadColorIndex { index: u8, x: i64, y: i64 },
    /// First RLE pixel written outside the image.
    OutOfBoundsPixel { x: i64, y: i64 },
    /// The RLE stream ran out without an end-of-bitmap code.
    MissingEndOfBitmap,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::FileSizeMismatch { reported, actual } => write!(
                f,
                "Reported file size ({reported}) does not equal actual file size ({actual})"
            ),
            Warning::BadWidth => f.write_str("Bad width"),
            Warning::BadHeight => f.write_str("Bad height"),
            Warning::PlanesNotOne(_) => f.write_str("Planes is required to be 1"),
            Warning::CompressedTopDown => f.write_str("Compressed images may not be top-down"),
            Warning::MissingSizeImage => {
                f.write_str("SizeImage is required for compressed images")
            }
            Warning::PaletteOverlapsBitmap { entries } => write!(
                f,
                "Bitmap overlaps color table. Assuming there are only {entries} colors in color table"
            ),
            Warning::ThreeBytePaletteEntries => f.write_str(
                "Bitmap overlaps color table. Assuming there are three bytes per color table entry, instead of four",
            ),
            Warning::InvalidColorSpace(cs) => write!(f, "Invalid color space type 0x{cs:x}"),
            Warning::UnexpectedEndOfFile => f.write_str("Unexpected end of file"),
            Warning::BadColorIndex { index, x, y } => {
                write!(f, "Bad palette index 0x{index:02x} at ({x},{y})")
            }
            Warning::OutOfBoundsPixel { x, y } => write!(f, "Out of bounds pixel ({x},{y})"),
            Warning::MissingEndOfBitmap => {
                f.write_str("Compressed data ended without an EOBMP code")
            }
        }
    }
}

/// Log and store a warning.
pub(crate) fn record(list: &mut Vec<Warning>, warning: Warning) {
    log::warn!("{warning}");
    list.push(warning);
}

// ── Headers ─────────────────────────────────────────────────────────

/// The 14-byte `BITMAPFILEHEADER`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: [u8; 2],
    pub reported_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// `bfOffBits`: absolute offset of the pixel data.
    pub pixel_offset: u32,
    pub warnings: Vec<Warning>,
}

/// Semantic compression type, after resolving the header-variant-specific
/// meaning of the raw code.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Rle4,
    Rle8,
    Rle24,
    Huffman1D,
    Jpeg,
    Png,
    Unknown,
}

impl Compression {
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Rle4 => "rle4",
            Compression::Rle8 => "rle8",
            Compression::Rle24 => "rle24",
            Compression::Huffman1D => "huffman1d",
            Compression::Jpeg => "jpeg",
            Compression::Png => "png",
            Compression::Unknown => "unknown",
        }
    }
}

/// OS/2 2.x fields past the 40-byte prefix. Each is present only if the
/// header is long enough to hold it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Os2Fields {
    pub units: Option<u16>,
    pub reserved: Option<u16>,
    pub recording: Option<u16>,
    pub rendering: Option<u16>,
    pub size1: Option<u32>,
    pub size2: Option<u32>,
    pub color_encoding: Option<u32>,
    pub identifier: Option<u32>,
}

/// Channel masks stored inside a 52-byte or larger header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CieXyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Color space block of v4 and v5 headers.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorSpace {
    pub cs_type: u32,
    /// Whether `cs_type` is allowed for this header version.
    pub valid: bool,
    /// Red, green and blue endpoints.
    pub endpoints: [CieXyz; 3],
    /// Red, green and blue gamma (16.16 fixed point).
    pub gamma: [f64; 3],
}

/// The v5-only trailer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct V5Fields {
    pub intent: Option<u32>,
    pub profile_data: Option<u32>,
    pub profile_size: Option<u32>,
    pub reserved: Option<u32>,
}

/// Where the header says the color profile is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfileRef {
    pub linked: bool,
    /// Absolute file offset. Zero when the header has no location fields.
    pub offset: u64,
    pub size: u64,
}

/// A decoded info header plus the values derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: i32,
    /// Raw height; negative means top-down.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression_code: Option<u32>,
    pub compression: Compression,
    pub size_image: Option<u32>,
    pub x_pels_per_meter: Option<i32>,
    pub y_pels_per_meter: Option<i32>,
    pub clr_used: Option<u32>,
    pub clr_important: Option<u32>,
    pub os2: Option<Os2Fields>,
    pub masks: Option<ChannelMasks>,
    pub color_space: Option<ColorSpace>,
    pub v5: Option<V5Fields>,
    pub palette_entries: usize,
    /// 3 (OS/2 `RGBTRIPLE`) or 4 (`RGBQUAD`).
    pub palette_entry_width: usize,
    /// Size of the separate bitfields segment following the header, if any.
    pub bitfields_segment: Option<usize>,
    pub profile: Option<ProfileRef>,
    pub warnings: Vec<Warning>,
}

impl InfoHeader {
    pub(crate) fn new(size: u32, palette_entry_width: usize) -> Self {
        Self {
            size,
            width: 0,
            height: 0,
            planes: 0,
            bit_count: 0,
            compression_code: None,
            compression: Compression::None,
            size_image: None,
            x_pels_per_meter: None,
            y_pels_per_meter: None,
            clr_used: None,
            clr_important: None,
            os2: None,
            masks: None,
            color_space: None,
            v5: None,
            palette_entries: 0,
            palette_entry_width,
            bitfields_segment: None,
            profile: None,
            warnings: Vec::new(),
        }
    }

    pub fn image_width(&self) -> i64 {
        i64::from(self.width)
    }

    /// Height in rows, regardless of storage order.
    pub fn image_height(&self) -> i64 {
        i64::from(self.height).abs()
    }

    pub fn top_down(&self) -> bool {
        self.height < 0
    }

    pub fn is_compressed(&self) -> bool {
        self.compression != Compression::None
    }

    /// Bytes from the start of one stored row to the next.
    pub fn row_stride(&self) -> i64 {
        row_stride(self.image_width(), self.bit_count)
    }
}

/// `ceil(width * bit_count / 32) * 4`.
pub fn row_stride(width: i64, bit_count: u16) -> i64 {
    (width * i64::from(bit_count) + 31) / 32 * 4
}

// ── Color tables ────────────────────────────────────────────────────

/// The optional 12- or 16-byte block of channel masks after a v3 header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitfieldsSegment {
    pub offset: u64,
    /// Red, green, blue and (16-byte segments) alpha masks.
    pub masks: Vec<u32>,
}

/// A color table entry, reordered from the stored B,G,R[,x].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: RGB8,
    /// The fourth byte of 4-byte entries.
    pub pad: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTable {
    pub offset: u64,
    pub entry_width: usize,
    pub entries: Vec<PaletteEntry>,
    pub warnings: Vec<Warning>,
}

/// Bytes between structures that nothing refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnusedRegion {
    pub offset: u64,
    pub len: u64,
}

// ── Pixel data ──────────────────────────────────────────────────────

/// Samples of one uncompressed row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSamples {
    /// Palette indices (1, 2, 4 and 8 bits per pixel).
    Indices { depth: u16, values: Vec<u8> },
    /// Raw 16-bit pixels.
    Words(Vec<u16>),
    /// 24-bit pixels, reordered from the stored B,G,R.
    Rgb(Vec<RGB8>),
    /// Raw 32-bit pixels.
    Dwords(Vec<u32>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelRow {
    pub offset: u64,
    /// Logical row number; row 0 is the top of the image.
    pub row: i64,
    pub samples: RowSamples,
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RleKind {
    Rle4,
    Rle8,
    Rle24,
}

/// One pixel value inside an RLE literal run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    Index(u8),
    Rgb(RGB8),
}

/// The repeated value of an RLE compressed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunValue {
    /// RLE4: two indices used alternately.
    Pair(u8, u8),
    /// RLE8.
    Index(u8),
    /// RLE24.
    Rgb(RGB8),
    /// RLE24 run whose color was cut off by the end of the stream.
    Incomplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeltaMove {
    pub dx: u8,
    pub dy: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RleItem {
    /// `count` pixels stored verbatim. `pixels` is shorter than `count` only
    /// when the stream ended inside the run.
    Literal { count: u8, pixels: Vec<Sample> },
    /// `count` pixels of a repeated value.
    Run { count: u8, value: RunValue },
    EndOfLine,
    EndOfBitmap,
    /// A position change; `None` if the stream ended before the offsets.
    Delta(Option<DeltaMove>),
}

/// The RLE items that belong to one image row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RleRow {
    pub offset: u64,
    /// Logical row number, `None` once the position has left the image.
    pub row: Option<i64>,
    pub items: Vec<RleItem>,
    /// Stream bytes consumed by this row.
    pub byte_count: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RleStream {
    pub kind: RleKind,
    pub rows: Vec<RleRow>,
    /// Stream bytes consumed, up to and including the end-of-bitmap code.
    pub consumed: u64,
    /// Whether an end-of-bitmap code was seen.
    pub terminated: bool,
    /// Warnings about the stream as a whole, reported after the last row.
    pub warnings: Vec<Warning>,
}

impl RleStream {
    pub fn items(&self) -> impl Iterator<Item = &RleItem> {
        self.rows.iter().flat_map(|r| r.items.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelPayload {
    Rows(Vec<PixelRow>),
    Rle(RleStream),
    /// Compressed with a scheme this crate only locates.
    Undecodable(Compression),
    /// Not decoded: bad geometry, implausible stride, truncated data,
    /// top-down compressed data, or pixel decoding switched off.
    Skipped,
}

/// The pixel data section.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapBits {
    pub offset: u64,
    /// `SizeImage` from the header, `None` if absent or zero.
    pub size_image: Option<u32>,
    pub row_stride: i64,
    /// Size of the image if it were stored uncompressed.
    pub calculated_size: i64,
    /// Bytes between the pixel offset and the end of the file, when no
    /// color profile follows.
    pub implied_size: Option<u64>,
    /// Bytes the pixel data actually occupies (0 when unknown).
    pub actual_size: i64,
    pub payload: PixelPayload,
    pub warnings: Vec<Warning>,
}

impl BitmapBits {
    /// Consumed RLE bytes over the uncompressed size.
    pub fn compression_ratio(&self) -> Option<f64> {
        match &self.payload {
            PixelPayload::Rle(s) if self.calculated_size > 0 => {
                Some(s.consumed as f64 / self.calculated_size as f64)
            }
            _ => None,
        }
    }
}

/// The color profile section of a v5 file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileSection {
    pub offset: u64,
    pub size: u64,
    /// For linked profiles, the raw (Windows-1252, NUL-terminated) file name.
    pub linked_name: Option<Vec<u8>>,
}

// ── The report ──────────────────────────────────────────────────────

/// Everything an inspection found, section by section in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inspection {
    pub file_size: u64,
    pub file_header: Option<FileHeader>,
    pub variant: Option<HeaderVariant>,
    pub variant_name: Option<&'static str>,
    pub info: Option<InfoHeader>,
    pub bitfields: Option<BitfieldsSegment>,
    pub color_table: Option<ColorTable>,
    pub bitmap: Option<BitmapBits>,
    pub profile: Option<ProfileSection>,
    pub unused: Vec<UnusedRegion>,
}

impl Inspection {
    /// All warnings, in file order.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        let headers = self.file_header.iter().flat_map(|h| &h.warnings);
        let info = self.info.iter().flat_map(|i| &i.warnings);
        let table = self.color_table.iter().flat_map(|t| &t.warnings);
        let bitmap = self.bitmap.iter().flat_map(|bits| {
            let (rows, rle_rows, stream): (&[PixelRow], &[RleRow], &[Warning]) =
                match &bits.payload {
                    PixelPayload::Rows(rows) => (rows.as_slice(), &[][..], &[][..]),
                    PixelPayload::Rle(s) => (&[][..], s.rows.as_slice(), s.warnings.as_slice()),
                    _ => (&[][..], &[][..], &[][..]),
                };
            bits.warnings
                .iter()
                .chain(rows.iter().flat_map(|r| &r.warnings))
                .chain(rle_rows.iter().flat_map(|r| &r.warnings))
                .chain(stream)
        });
        headers.chain(info).chain(table).chain(bitmap)
    }
}

/// An inspection that may have stopped at a fatal error. The report holds
/// everything decoded up to that point.
#[derive(Debug)]
pub struct PartialInspection {
    pub inspection: Inspection,
    pub error: Option<InspectError>,
}

impl PartialInspection {
    pub fn into_result(self) -> Result<Inspection, InspectError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.inspection),
        }
    }
}
