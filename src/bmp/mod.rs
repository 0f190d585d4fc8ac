//! BMP structure walker.
//!
//! Use top-level [`crate::inspect`] or [`crate::InspectRequest`]. The
//! header-level decoders are public for callers that only need one piece.
//!
//! The walk follows the file front to back: file header, info header,
//! optional bitfields segment, color table, pixel data, color profile. Each
//! stage checks that its structure lies where the previous ones say it
//! should and records any gap as an unused region.

mod header;
mod latch;
mod palette;
mod pixels;
mod rle;
mod utils;
mod version;

pub use header::{
    check_bit_count, compression_label, compression_type, decode_info_header, file_type_name,
};
pub use version::{HeaderVariant, detect};

use alloc::vec::Vec;
use enough::Stop;

use self::header::FILE_HEADER_LEN;
use self::latch::{BadColor, Latch};
use self::pixels::RowLayout;
use self::rle::RleParams;
use crate::error::{InspectError, Region};
use crate::limits::Limits;
use crate::report::{
    BitfieldsSegment, BitmapBits, ColorTable, Compression, InfoHeader, Inspection,
    PartialInspection, PixelPayload, ProfileSection, RleKind, UnusedRegion, Warning, record,
};

/// Smallest input that holds a file header and an info header size field.
const MIN_FILE_LEN: usize = 18;

/// State of one inspection, threaded through every stage.
struct ParseContext<'a> {
    data: &'a [u8],
    /// Absolute offset of the next structure.
    pos: u64,
    limits: &'a Limits,
    stop: &'a dyn Stop,
    /// Cleared by geometry that makes the pixel data meaningless.
    decode_pixels: bool,
    bad_color: Latch<BadColor>,
    report: Inspection,
}

/// Inspect a whole BMP file. Always returns the report built so far, plus
/// the error that stopped the walk, if any.
pub(crate) fn inspect(
    data: &[u8],
    limits: &Limits,
    decode_pixels: bool,
    stop: &dyn Stop,
) -> PartialInspection {
    let mut ctx = ParseContext {
        data,
        pos: 0,
        limits,
        stop,
        decode_pixels,
        bad_color: Latch::default(),
        report: Inspection {
            file_size: data.len() as u64,
            ..Inspection::default()
        },
    };
    let error = ctx.run().err();
    if let Some(e) = &error {
        log::debug!("inspection stopped at offset {}: {e}", ctx.pos);
    }
    PartialInspection {
        inspection: ctx.report,
        error,
    }
}

impl<'a> ParseContext<'a> {
    fn file_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn run(&mut self) -> Result<(), InspectError> {
        if self.data.len() < MIN_FILE_LEN {
            return Err(InspectError::TooSmall);
        }
        let header_size = utils::u32_le(self.data, FILE_HEADER_LEN).unwrap_or(0);

        let file_header = header::decode_file_header(self.data, self.file_size(), header_size)?;
        let pixel_offset = file_header.pixel_offset;
        self.report.file_header = Some(file_header);
        self.pos = FILE_HEADER_LEN as u64;

        let variant = detect(self.data);
        self.report.variant = variant;
        self.report.variant_name = Some(match variant {
            Some(HeaderVariant::WinV3) if utils::u16_le(self.data, 28) == Some(2) => {
                "Windows CE BMP"
            }
            Some(v) => v.name(),
            None => "Unknown",
        });
        log::trace!(
            "file header: {} bytes, info header size {header_size}, variant {:?}",
            self.file_size(),
            variant
        );

        let (variant, info) = self.read_info_header(variant, header_size)?;
        let entries = self.read_tables(variant, &info, pixel_offset)?;

        let offset = u64::from(pixel_offset);
        if offset < self.pos || offset > self.file_size() {
            return Err(InspectError::BadPixelOffset {
                offset: pixel_offset,
                min: self.pos,
                max: self.file_size(),
            });
        }
        self.skip_to(offset);

        let actual = self.read_bits(&info, entries)?;
        if actual < 1 {
            // Nothing reliable to measure the rest of the file from.
            return Ok(());
        }
        self.pos = self.pos.saturating_add(actual as u64);

        if let Some(profile) = info.profile {
            if self.pos < profile.offset {
                self.skip_to(profile.offset);
            } else if self.pos > profile.offset {
                return Err(InspectError::InvalidProfileLocation);
            }
            let end = self
                .pos
                .checked_add(profile.size)
                .filter(|&end| end <= self.file_size())
                .ok_or(InspectError::InvalidProfileSize)?;
            let bytes = &self.data[self.pos as usize..end as usize];
            self.report.profile = Some(ProfileSection {
                offset: self.pos,
                size: profile.size,
                linked_name: profile.linked.then(|| bytes.to_vec()),
            });
            self.pos = end;
        }

        if self.pos < self.file_size() {
            self.skip_to(self.file_size());
        }
        Ok(())
    }

    /// Record the bytes up to `target` as unused and move there.
    fn skip_to(&mut self, target: u64) {
        if target > self.pos {
            self.report.unused.push(UnusedRegion {
                offset: self.pos,
                len: target - self.pos,
            });
            self.pos = target;
        }
    }

    /// The next `len` bytes, or an end-of-file error naming `region`.
    fn take(&self, len: usize, region: Region) -> Result<&'a [u8], InspectError> {
        let data = self.data;
        let start = self.pos as usize;
        start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or(InspectError::UnexpectedEof(region))
    }

    fn read_info_header(
        &mut self,
        variant: Option<HeaderVariant>,
        header_size: u32,
    ) -> Result<(HeaderVariant, InfoHeader), InspectError> {
        let len = header_size as usize;
        if self.file_size() - self.pos < u64::from(header_size) {
            return Err(InspectError::UnexpectedEof(Region::InfoHeader));
        }
        let variant = variant.ok_or(InspectError::UnsupportedHeader(header_size))?;
        let d = self.take(len, Region::InfoHeader)?;

        let info = header::decode_info_header(variant, d, self.limits)?;
        self.report.info = Some(info.clone());
        check_bit_count(variant, info.bit_count, info.compression_code)?;

        let compressed_top_down =
            info.is_compressed() && info.compression != Compression::Unknown && info.top_down();
        if info.width < 1 || info.image_height() < 1 || compressed_top_down {
            log::debug!("pixel data will not be decoded: unusable geometry");
            self.decode_pixels = false;
        }
        self.pos += u64::from(header_size);
        Ok((variant, info))
    }

    /// Bitfields segment and color table. Returns the usable palette size.
    fn read_tables(
        &mut self,
        variant: HeaderVariant,
        info: &InfoHeader,
        pixel_offset: u32,
    ) -> Result<usize, InspectError> {
        if let Some(len) = info.bitfields_segment {
            let bytes = self.take(len, Region::Bitfields)?;
            self.report.bitfields = Some(BitfieldsSegment {
                offset: self.pos,
                masks: palette::decode_bitfields(bytes),
            });
            self.pos += len as u64;
        }

        let layout = palette::fit_table(
            variant,
            info.palette_entries,
            info.palette_entry_width,
            self.pos,
            pixel_offset,
        );
        let byte_len = layout.byte_len();
        if byte_len == 0 {
            return Ok(0);
        }
        let mut table = ColorTable {
            offset: self.pos,
            entry_width: layout.entry_width,
            entries: Vec::new(),
            warnings: layout.warnings,
        };
        let bytes = match self.take(byte_len, Region::ColorTable) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.report.color_table = Some(table);
                return Err(e);
            }
        };
        table.entries = palette::decode_color_table(bytes, layout.entry_width);
        log::trace!("color table: {} entries at {}", table.entries.len(), self.pos);
        self.report.color_table = Some(table);
        self.pos += byte_len as u64;
        Ok(layout.entries)
    }

    /// The pixel data stage. Returns the number of bytes the pixel data
    /// occupies, 0 if unknown.
    fn read_bits(
        &mut self,
        info: &InfoHeader,
        palette_entries: usize,
    ) -> Result<i64, InspectError> {
        let data = self.data;
        let region = &data[self.pos as usize..];
        let stride = info.row_stride();
        let calculated = stride.saturating_mul(info.image_height());

        let mut bits = BitmapBits {
            offset: self.pos,
            size_image: info.size_image.filter(|&s| s != 0),
            row_stride: stride,
            calculated_size: calculated,
            implied_size: info.profile.is_none().then_some(region.len() as u64),
            actual_size: if info.is_compressed() { 0 } else { calculated },
            payload: PixelPayload::Skipped,
            warnings: Vec::new(),
        };

        let mut decode = self.decode_pixels;
        if !info.is_compressed() {
            if !self.limits.stride_plausible(stride) {
                log::debug!("pixel data will not be decoded: row stride {stride}");
                decode = false;
            } else if (region.len() as i64) < calculated {
                record(&mut bits.warnings, Warning::UnexpectedEndOfFile);
                decode = false;
            }
        }

        if decode {
            match self.decode_payload(info, region, palette_entries) {
                Ok(payload) => bits.payload = payload,
                Err(e) => {
                    self.report.bitmap = Some(bits);
                    return Err(e);
                }
            }
        }
        if let PixelPayload::Rle(stream) = &bits.payload {
            bits.actual_size = stream.consumed as i64;
        }

        let actual = bits.actual_size;
        self.report.bitmap = Some(bits);
        Ok(actual)
    }

    fn decode_payload(
        &mut self,
        info: &InfoHeader,
        region: &[u8],
        palette_entries: usize,
    ) -> Result<PixelPayload, InspectError> {
        self.limits.check_pixels(info.image_width(), info.image_height())?;
        self.stop.check()?;

        let kind = match (info.compression, info.bit_count) {
            (Compression::None, _) => {
                let layout = RowLayout {
                    offset: self.pos,
                    width: info.image_width() as usize,
                    height: info.image_height() as usize,
                    stride: info.row_stride() as usize,
                    bit_count: info.bit_count,
                    top_down: info.top_down(),
                    palette_entries,
                };
                let rows = pixels::decode_rows(region, &layout, &mut self.bad_color, self.stop)?;
                return Ok(PixelPayload::Rows(rows));
            }
            (Compression::Rle4, 4) => RleKind::Rle4,
            (Compression::Rle8, 8) => RleKind::Rle8,
            (Compression::Rle24, 24) => RleKind::Rle24,
            (Compression::Rle4 | Compression::Rle8 | Compression::Rle24, depth) => {
                log::debug!("{} data at {depth} bpp is not decoded", info.compression.as_str());
                return Ok(PixelPayload::Skipped);
            }
            (other, _) => return Ok(PixelPayload::Undecodable(other)),
        };

        let params = RleParams {
            offset: self.pos,
            kind,
            width: info.image_width(),
            height: info.image_height(),
            palette_entries,
        };
        let stream = rle::decode_rle(region, params, &mut self.bad_color, self.stop)?;
        Ok(PixelPayload::Rle(stream))
    }
}
