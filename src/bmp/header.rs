//! File header and info header decoders.
//!
//! Info header decoders are pure functions of the header bytes. They decode
//! whatever fields fit in the slice they are given and leave the rest unset:
//! OS/2 v2 headers routinely stop part way through the 64-byte layout.

use alloc::string::String;

use super::utils::{fixed_2_30, fixed_16_16, i32_le, u16_le, u32_le};
use super::version::HeaderVariant;
use crate::error::InspectError;
use crate::limits::Limits;
use crate::report::{
    ChannelMasks, CieXyz, ColorSpace, Compression, FileHeader, InfoHeader, LCS_CALIBRATED_RGB,
    LCS_SRGB, LCS_WINDOWS_COLOR_SPACE, Os2Fields, PROFILE_EMBEDDED, PROFILE_LINKED, ProfileRef,
    V5Fields, Warning, record,
};

const BI_RGB: u32 = 0;
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;
const BI_BITFIELDS: u32 = 3;
const BI_JPEG: u32 = 4;
const BI_PNG: u32 = 5;
const BI_ALPHABITFIELDS: u32 = 6;

/// Size of `BITMAPFILEHEADER`.
pub(crate) const FILE_HEADER_LEN: usize = 14;

/// Long name of a two-letter file type tag.
pub fn file_type_name(tag: [u8; 2]) -> Option<&'static str> {
    Some(match &tag {
        b"BA" => "Bitmap Array",
        b"BM" => "Bitmap",
        b"CI" => "Color Icon",
        b"CP" => "Color Pointer",
        b"IC" => "Icon",
        b"PT" => "Pointer",
        _ => return None,
    })
}

/// Decode the 14-byte file header. `file_size` is the real length of the
/// file, `header_size` the info header size field that follows.
pub(crate) fn decode_file_header(
    d: &[u8],
    file_size: u64,
    header_size: u32,
) -> Result<FileHeader, InspectError> {
    let d = d.get(..FILE_HEADER_LEN).ok_or(InspectError::TooSmall)?;
    let file_type = [d[0], d[1]];
    if file_type_name(file_type).is_none() {
        return Err(InspectError::NotBmp);
    }
    if &file_type != b"BM" {
        return Err(InspectError::UnsupportedFileType(
            String::from_utf8_lossy(&file_type).into_owned(),
        ));
    }

    let mut header = FileHeader {
        file_type,
        reported_size: u32_le(d, 2).unwrap_or(0),
        reserved1: u16_le(d, 6).unwrap_or(0),
        reserved2: u16_le(d, 8).unwrap_or(0),
        pixel_offset: u32_le(d, 10).unwrap_or(0),
        warnings: alloc::vec::Vec::new(),
    };

    // OS/2 files may set the size field to the size of the two headers.
    let reported = u64::from(header.reported_size);
    if reported != file_size && reported != FILE_HEADER_LEN as u64 + u64::from(header_size) {
        record(
            &mut header.warnings,
            Warning::FileSizeMismatch {
                reported: header.reported_size,
                actual: file_size,
            },
        );
    }
    Ok(header)
}

/// Resolve a raw compression code. Codes 3 and 4 mean different things on
/// OS/2 v2.
pub fn compression_type(variant: HeaderVariant, code: u32) -> Compression {
    match code {
        BI_RGB => Compression::None,
        BI_RLE8 => Compression::Rle8,
        BI_RLE4 => Compression::Rle4,
        3 if variant == HeaderVariant::Os2V2 => Compression::Huffman1D,
        BI_BITFIELDS => Compression::None,
        4 if variant == HeaderVariant::Os2V2 => Compression::Rle24,
        BI_JPEG => Compression::Jpeg,
        BI_PNG => Compression::Png,
        BI_ALPHABITFIELDS => Compression::None,
        _ => Compression::Unknown,
    }
}

/// Description of a raw compression code as used by `variant`.
pub fn compression_label(variant: HeaderVariant, code: u32) -> &'static str {
    match code {
        BI_RGB => "BI_RGB (uncompressed)",
        BI_RLE8 => "BI_RLE8",
        BI_RLE4 => "BI_RLE4",
        3 if variant == HeaderVariant::Os2V2 => "Huffman 1D",
        BI_BITFIELDS => "BI_BITFIELDS (uncompressed)",
        4 if variant == HeaderVariant::Os2V2 => "RLE24",
        BI_JPEG => "BI_JPEG",
        BI_PNG => "BI_PNG",
        BI_ALPHABITFIELDS => "BI_ALPHABITFIELDS (uncompressed)",
        _ => "(unrecognized)",
    }
}

/// Decode an info header of the given variant. `d` is exactly the header
/// region (its length is the header size field).
pub fn decode_info_header(
    variant: HeaderVariant,
    d: &[u8],
    limits: &Limits,
) -> Result<InfoHeader, InspectError> {
    if d.len() < variant.min_len() {
        return Err(InspectError::UnexpectedEof(crate::error::Region::InfoHeader));
    }
    let size = u32_le(d, 0).unwrap_or(d.len() as u32);
    match variant {
        HeaderVariant::Os2V1 | HeaderVariant::WinV2 => Ok(decode_core(size, d)),
        HeaderVariant::Os2V2 => decode_os2v2(variant, size, d, limits),
        HeaderVariant::WinV3 => decode_v3(variant, size, d, limits),
        HeaderVariant::V3Size52 | HeaderVariant::V3Size56 | HeaderVariant::WinV4 => {
            decode_v4(variant, size, d, limits)
        }
        HeaderVariant::WinV5 => decode_v5(variant, size, d, limits),
    }
}

/// `BITMAPCOREHEADER`: 16-bit dimensions, no compression, 3-byte palette.
fn decode_core(size: u32, d: &[u8]) -> InfoHeader {
    let mut h = InfoHeader::new(size, 3);
    h.width = i32::from(u16_le(d, 4).unwrap_or(0));
    h.height = i32::from(u16_le(d, 6).unwrap_or(0));
    h.planes = u16_le(d, 8).unwrap_or(0);
    h.bit_count = u16_le(d, 10).unwrap_or(0);
    if h.bit_count <= 8 {
        h.palette_entries = 1 << h.bit_count;
    }
    log::trace!("core header: {}x{} {} bpp", h.width, h.height, h.bit_count);
    h
}

/// The 40-byte `BITMAPINFOHEADER` layout, decoded as far as `d` reaches
/// (at least 16 bytes).
fn decode_v3(
    variant: HeaderVariant,
    size: u32,
    d: &[u8],
    limits: &Limits,
) -> Result<InfoHeader, InspectError> {
    let mut h = InfoHeader::new(size, 4);

    h.width = i32_le(d, 4).unwrap_or(0);
    if h.width < 1 {
        record(&mut h.warnings, Warning::BadWidth);
    }
    h.height = i32_le(d, 8).unwrap_or(0);
    if h.image_height() < 1 {
        record(&mut h.warnings, Warning::BadHeight);
    }
    h.planes = u16_le(d, 12).unwrap_or(0);
    if h.planes != 1 {
        record(&mut h.warnings, Warning::PlanesNotOne(h.planes));
    }
    h.bit_count = u16_le(d, 14).unwrap_or(0);

    if let Some(code) = u32_le(d, 16) {
        h.compression_code = Some(code);
        h.compression = compression_type(variant, code);
        if h.is_compressed() && h.compression != Compression::Unknown && h.top_down() {
            record(&mut h.warnings, Warning::CompressedTopDown);
        }
        if variant == HeaderVariant::WinV3 {
            h.bitfields_segment = match code {
                BI_BITFIELDS => Some(12),
                BI_ALPHABITFIELDS => Some(16),
                _ => None,
            };
        }
    }

    h.size_image = u32_le(d, 20);
    if h.size_image.unwrap_or(0) == 0 && h.is_compressed() {
        record(&mut h.warnings, Warning::MissingSizeImage);
    }
    h.x_pels_per_meter = i32_le(d, 24);
    h.y_pels_per_meter = i32_le(d, 28);
    h.clr_used = u32_le(d, 32);
    if let Some(clr_used) = h.clr_used {
        limits.check_palette(clr_used)?;
    }
    h.clr_important = u32_le(d, 36);

    let clr_used = h.clr_used.unwrap_or(0) as usize;
    h.palette_entries = if (1..=8).contains(&h.bit_count) && clr_used == 0 {
        1 << h.bit_count
    } else {
        clr_used
    };

    log::trace!(
        "{} header: {}x{} {} bpp, compression {}",
        variant.name(),
        h.width,
        h.height,
        h.bit_count,
        h.compression.as_str()
    );
    Ok(h)
}

fn decode_os2v2(
    variant: HeaderVariant,
    size: u32,
    d: &[u8],
    limits: &Limits,
) -> Result<InfoHeader, InspectError> {
    let mut h = decode_v3(variant, size, d, limits)?;
    if d.len() >= 42 {
        h.os2 = Some(Os2Fields {
            units: u16_le(d, 40),
            reserved: u16_le(d, 42),
            recording: u16_le(d, 44),
            rendering: u16_le(d, 46),
            size1: u32_le(d, 48),
            size2: u32_le(d, 52),
            color_encoding: u32_le(d, 56),
            identifier: u32_le(d, 60),
        });
    }
    Ok(h)
}

/// Whether a `CSType` value is allowed for the header version.
fn cs_type_is_valid(variant: HeaderVariant, cs_type: u32) -> bool {
    match variant {
        HeaderVariant::WinV4 => cs_type == LCS_CALIBRATED_RGB,
        HeaderVariant::WinV5 => matches!(
            cs_type,
            LCS_CALIBRATED_RGB
                | LCS_SRGB
                | LCS_WINDOWS_COLOR_SPACE
                | PROFILE_LINKED
                | PROFILE_EMBEDDED
        ),
        _ => false,
    }
}

fn cie_xyz(d: &[u8], offset: usize) -> CieXyz {
    CieXyz {
        x: fixed_2_30(d, offset).unwrap_or(0.0),
        y: fixed_2_30(d, offset + 4).unwrap_or(0.0),
        z: fixed_2_30(d, offset + 8).unwrap_or(0.0),
    }
}

/// v4 and the 52/56-byte headers: the v3 prefix followed by channel masks
/// and, for full v4 headers, the color space block.
fn decode_v4(
    variant: HeaderVariant,
    size: u32,
    d: &[u8],
    limits: &Limits,
) -> Result<InfoHeader, InspectError> {
    let mut h = decode_v3(variant, size, &d[..40], limits)?;

    if let (Some(red), Some(green), Some(blue)) = (u32_le(d, 40), u32_le(d, 44), u32_le(d, 48)) {
        h.masks = Some(ChannelMasks {
            red,
            green,
            blue,
            alpha: u32_le(d, 52),
        });
    }

    if d.len() < 108 {
        return Ok(h);
    }
    let cs_type = u32_le(d, 56).unwrap_or(0);
    let valid = cs_type_is_valid(variant, cs_type);
    if !valid {
        record(&mut h.warnings, Warning::InvalidColorSpace(cs_type));
    }
    match cs_type {
        PROFILE_LINKED => {
            h.profile = Some(ProfileRef {
                linked: true,
                offset: 0,
                size: 0,
            })
        }
        PROFILE_EMBEDDED => {
            h.profile = Some(ProfileRef {
                linked: false,
                offset: 0,
                size: 0,
            })
        }
        _ => {}
    }
    h.color_space = Some(ColorSpace {
        cs_type,
        valid,
        endpoints: [cie_xyz(d, 60), cie_xyz(d, 72), cie_xyz(d, 84)],
        gamma: [
            fixed_16_16(d, 96).unwrap_or(0.0),
            fixed_16_16(d, 100).unwrap_or(0.0),
            fixed_16_16(d, 104).unwrap_or(0.0),
        ],
    });
    Ok(h)
}

fn decode_v5(
    variant: HeaderVariant,
    size: u32,
    d: &[u8],
    limits: &Limits,
) -> Result<InfoHeader, InspectError> {
    let mut h = decode_v4(variant, size, &d[..108], limits)?;
    let v5 = V5Fields {
        intent: u32_le(d, 108),
        profile_data: u32_le(d, 112),
        profile_size: u32_le(d, 116),
        reserved: u32_le(d, 120),
    };
    // ProfileData is relative to the start of the info header.
    if let Some(profile) = h.profile.as_mut() {
        profile.offset = FILE_HEADER_LEN as u64 + u64::from(v5.profile_data.unwrap_or(0));
        profile.size = u64::from(v5.profile_size.unwrap_or(0));
    }
    h.v5 = Some(v5);
    Ok(h)
}

/// Check the bit depth against the header variant and compression.
pub fn check_bit_count(
    variant: HeaderVariant,
    bit_count: u16,
    compression_code: Option<u32>,
) -> Result<(), InspectError> {
    let ok = match bit_count {
        0 => {
            matches!(variant, HeaderVariant::WinV4 | HeaderVariant::WinV5)
                && matches!(compression_code, Some(BI_JPEG | BI_PNG))
        }
        1 | 4 | 8 | 24 => true,
        // Windows CE extension.
        2 => variant == HeaderVariant::WinV3,
        16 | 32 => matches!(
            variant,
            HeaderVariant::WinV3
                | HeaderVariant::V3Size52
                | HeaderVariant::V3Size56
                | HeaderVariant::WinV4
                | HeaderVariant::WinV5
        ),
        _ => false,
    };
    if !ok {
        return Err(InspectError::InvalidBitCount { bit_count });
    }
    Ok(())
}
