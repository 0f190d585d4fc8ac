//! Header variant detection.
//!
//! The info header size is the primary discriminant, but OS/2 v2 headers are
//! variable length (16..=64 bytes) and overlap the sizes Windows uses, so a
//! couple of weaker signals break the tie.

use super::utils::{u16_le, u32_le};

/// The info header layouts this crate can decode.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderVariant {
    /// OS/2 1.x `BITMAPCOREHEADER`, 12 bytes, file size field = 26.
    Os2V1,
    /// Windows 2.x `BITMAPCOREHEADER`, 12 bytes.
    WinV2,
    /// OS/2 2.x `BITMAPINFOHEADER2`, 16..=64 bytes.
    Os2V2,
    /// Windows 3.x `BITMAPINFOHEADER`, 40 bytes.
    WinV3,
    /// `BITMAPV2INFOHEADER`, 52 bytes (RGB masks in the header).
    V3Size52,
    /// `BITMAPV3INFOHEADER`, 56 bytes (RGBA masks in the header).
    V3Size56,
    /// `BITMAPV4HEADER`, 108 bytes.
    WinV4,
    /// `BITMAPV5HEADER`, 124 bytes.
    WinV5,
}

impl HeaderVariant {
    /// Human-readable name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            Self::Os2V1 => "OS/2 BMP v1",
            Self::Os2V2 => "OS/2 BMP v2",
            Self::WinV2 => "Windows BMP v2",
            Self::WinV3 => "Windows BMP v3",
            Self::V3Size52 => "BITMAPV2INFOHEADER",
            Self::V3Size56 => "BITMAPV3INFOHEADER",
            Self::WinV4 => "Windows BMP v4",
            Self::WinV5 => "Windows BMP v5",
        }
    }

    /// Prefix of the field names in the Windows SDK structure
    /// (`biWidth`, `bV4RedMask`, ...).
    pub fn field_prefix(self) -> &'static str {
        match self {
            Self::Os2V1 | Self::Os2V2 => "",
            Self::WinV2 => "bc",
            Self::WinV3 | Self::V3Size52 | Self::V3Size56 => "bi",
            Self::WinV4 => "bV4",
            Self::WinV5 => "bV5",
        }
    }

    /// Smallest info header, in bytes, the variant's decoder accepts.
    pub fn min_len(self) -> usize {
        match self {
            Self::Os2V1 | Self::WinV2 => 12,
            Self::Os2V2 => 16,
            Self::WinV3 => 40,
            Self::V3Size52 => 52,
            Self::V3Size56 => 56,
            Self::WinV4 => 108,
            Self::WinV5 => 124,
        }
    }

    pub fn is_os2(self) -> bool {
        matches!(self, Self::Os2V1 | Self::Os2V2)
    }

    /// Whether the header uses the 40-byte `BITMAPINFOHEADER` layout as a
    /// prefix (everything except the 12-byte core headers).
    pub fn is_v3_or_later(self) -> bool {
        !matches!(self, Self::Os2V1 | Self::WinV2)
    }
}

/// Classify the header variant from the start of a file.
///
/// `d` is the whole file (or at least its first 34 bytes). Returns `None`
/// for files shorter than 18 bytes and for unrecognized header sizes.
pub fn detect(d: &[u8]) -> Option<HeaderVariant> {
    let fsize = u32_le(d, 2)?;
    let size = u32_le(d, 14)?;
    let bit_count = u16_le(d, 28).unwrap_or(0);
    let compression = u32_le(d, 30).unwrap_or(0);

    // OS/2 v2 numbers its Huffman-1D and RLE24 schemes 3 and 4, which on
    // Windows would be BITFIELDS and JPEG. These depth/scheme pairs make no
    // sense for Windows.
    let os2_compression =
        (compression == 3 && bit_count == 1) || (compression == 4 && bit_count == 24);
    let os2_size = (16..=64).contains(&size);
    let header_only_fsize = u64::from(fsize) == 14 + u64::from(size);

    let variant = match size {
        12 if header_only_fsize => HeaderVariant::Os2V1,
        12 => HeaderVariant::WinV2,
        _ if os2_size && (os2_compression || header_only_fsize) => HeaderVariant::Os2V2,
        40 => HeaderVariant::WinV3,
        52 => HeaderVariant::V3Size52,
        56 => HeaderVariant::V3Size56,
        _ if os2_size => HeaderVariant::Os2V2,
        108 => HeaderVariant::WinV4,
        124 => HeaderVariant::WinV5,
        _ => return None,
    };
    Some(variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(fsize: u32, size: u32, bit_count: u16, compression: u32) -> [u8; 34] {
        let mut d = [0u8; 34];
        d[0] = b'B';
        d[1] = b'M';
        d[2..6].copy_from_slice(&fsize.to_le_bytes());
        d[14..18].copy_from_slice(&size.to_le_bytes());
        d[28..30].copy_from_slice(&bit_count.to_le_bytes());
        d[30..34].copy_from_slice(&compression.to_le_bytes());
        d
    }

    #[test]
    fn core_header_split_by_reported_size() {
        assert_eq!(detect(&prefix(26, 12, 8, 0)), Some(HeaderVariant::Os2V1));
        assert_eq!(detect(&prefix(1000, 12, 8, 0)), Some(HeaderVariant::WinV2));
    }

    #[test]
    fn windows_sizes() {
        assert_eq!(detect(&prefix(1000, 40, 24, 0)), Some(HeaderVariant::WinV3));
        assert_eq!(detect(&prefix(1000, 52, 24, 0)), Some(HeaderVariant::V3Size52));
        assert_eq!(detect(&prefix(1000, 56, 24, 0)), Some(HeaderVariant::V3Size56));
        assert_eq!(detect(&prefix(1000, 108, 24, 0)), Some(HeaderVariant::WinV4));
        assert_eq!(detect(&prefix(1000, 124, 24, 0)), Some(HeaderVariant::WinV5));
    }

    #[test]
    fn os2v2_heuristics() {
        // Odd sizes in range are always OS/2 v2.
        assert_eq!(detect(&prefix(1000, 64, 8, 0)), Some(HeaderVariant::Os2V2));
        assert_eq!(detect(&prefix(1000, 16, 8, 0)), Some(HeaderVariant::Os2V2));
        // A 40-byte header is OS/2 v2 when the compression/depth pair is
        // OS/2-only, or when the file size field only counts the headers.
        assert_eq!(detect(&prefix(1000, 40, 1, 3)), Some(HeaderVariant::Os2V2));
        assert_eq!(detect(&prefix(1000, 40, 24, 4)), Some(HeaderVariant::Os2V2));
        assert_eq!(detect(&prefix(54, 40, 8, 0)), Some(HeaderVariant::Os2V2));
        // 108 is out of the OS/2 range even with the flag set.
        assert_eq!(detect(&prefix(1000, 108, 24, 4)), Some(HeaderVariant::WinV4));
    }

    #[test]
    fn unknown_sizes() {
        assert_eq!(detect(&prefix(1000, 0, 8, 0)), None);
        assert_eq!(detect(&prefix(1000, 65, 8, 0)), None);
        assert_eq!(detect(&prefix(1000, 200, 8, 0)), None);
        assert_eq!(detect(&[0u8; 17]), None);
    }

    #[test]
    fn detection_ignores_bytes_past_the_prefix() {
        let mut long = prefix(1000, 40, 24, 0).to_vec();
        long.extend_from_slice(&[0xaa; 64]);
        assert_eq!(detect(&long), detect(&prefix(1000, 40, 24, 0)));
    }

    #[test]
    fn short_prefix_defaults_missing_signals() {
        // Only 18 bytes: bit depth and compression read as zero.
        let d = &prefix(1000, 40, 1, 3)[..18];
        assert_eq!(detect(d), Some(HeaderVariant::WinV3));
    }
}
