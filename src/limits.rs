use crate::error::InspectError;

/// Largest color table a header may declare before the file is treated as
/// corrupt.
pub const MAX_PALETTE_ENTRIES: u32 = 100_000;

/// Largest row stride, in bytes, that uncompressed rows are decoded with.
pub const MAX_ROW_STRIDE: u64 = 1_000_000;

/// Resource limits for an inspection.
///
/// The defaults are the format's own sanity bounds; `max_pixels` defaults to
/// `None` (no limit).
#[derive(Clone, Debug)]
pub struct Limits {
    /// Maximum `ClrUsed` value accepted from a header.
    pub max_palette_entries: u32,
    /// Uncompressed pixel rows with a larger stride are not decoded.
    pub max_row_stride: u64,
    /// Maximum pixel count (width * height) that will be decoded.
    pub max_pixels: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_palette_entries: MAX_PALETTE_ENTRIES,
            max_row_stride: MAX_ROW_STRIDE,
            max_pixels: None,
        }
    }
}

impl Limits {
    /// Check a declared color count. Returns Ok(()) or UnreasonablePaletteSize.
    pub(crate) fn check_palette(&self, clr_used: u32) -> Result<(), InspectError> {
        if clr_used > self.max_palette_entries {
            return Err(InspectError::UnreasonablePaletteSize(clr_used));
        }
        Ok(())
    }

    /// Whether a computed row stride is small enough to decode rows with.
    pub(crate) fn stride_plausible(&self, stride: i64) -> bool {
        stride >= 1 && stride as u64 <= self.max_row_stride
    }

    /// Check dimensions against the pixel limit. Returns Ok(()) or LimitExceeded.
    pub(crate) fn check_pixels(&self, width: i64, height: i64) -> Result<(), InspectError> {
        if let Some(max_px) = self.max_pixels {
            let pixels = width.max(0) as u64 * height.max(0) as u64;
            if pixels > max_px {
                return Err(InspectError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }
}
