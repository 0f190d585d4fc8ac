//! Color table and bitfields segment.

use alloc::vec::Vec;

use rgb::RGB8;

use super::utils::u32_le;
use super::version::HeaderVariant;
use crate::report::{PaletteEntry, Warning, record};

/// Final shape of the color table once the pixel data offset is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TableLayout {
    pub entries: usize,
    pub entry_width: usize,
    pub warnings: Vec<Warning>,
}

impl TableLayout {
    pub fn byte_len(&self) -> usize {
        self.entries.saturating_mul(self.entry_width)
    }
}

/// Fit the color table the header asked for into the bytes between the end
/// of the headers (`table_start`) and the pixel data (`pixel_offset`).
///
/// Some OS/2 v2 writers store 3-byte entries despite the 4-byte layout;
/// that is detected when the gap is exactly three bytes per entry. A table
/// that runs into the pixel data is cut down to what fits, provided at least
/// one entry does.
pub(crate) fn fit_table(
    variant: HeaderVariant,
    entries: usize,
    entry_width: usize,
    table_start: u64,
    pixel_offset: u32,
) -> TableLayout {
    let mut layout = TableLayout {
        entries,
        entry_width,
        warnings: Vec::new(),
    };
    if entries == 0 {
        return layout;
    }
    let available = i64::from(pixel_offset) - table_start as i64;

    if variant == HeaderVariant::Os2V2 && available == 3 * entries as i64 {
        layout.entry_width = 3;
        record(&mut layout.warnings, Warning::ThreeBytePaletteEntries);
    }

    let width = layout.entry_width as i64;
    if available >= width && available < width * entries as i64 {
        layout.entries = (available / width) as usize;
        record(
            &mut layout.warnings,
            Warning::PaletteOverlapsBitmap {
                entries: layout.entries,
            },
        );
    }
    layout
}

/// Decode B,G,R[,x] entries into display order.
pub(crate) fn decode_color_table(d: &[u8], entry_width: usize) -> Vec<PaletteEntry> {
    d.chunks_exact(entry_width)
        .map(|e| PaletteEntry {
            color: RGB8::new(e[2], e[1], e[0]),
            pad: e.get(3).copied(),
        })
        .collect()
}

/// Decode the 12- or 16-byte channel mask segment.
pub(crate) fn decode_bitfields(d: &[u8]) -> Vec<u32> {
    (0..4).map_while(|i| u32_le(d, i * 4)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_reorder_to_rgb() {
        let table = decode_color_table(&[0x10, 0x20, 0x30, 0x00, 0x01, 0x02, 0x03, 0xff], 4);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].color, RGB8::new(0x30, 0x20, 0x10));
        assert_eq!(table[0].pad, Some(0));
        assert_eq!(table[1].color, RGB8::new(0x03, 0x02, 0x01));
        assert_eq!(table[1].pad, Some(0xff));

        let table = decode_color_table(&[0x10, 0x20, 0x30], 3);
        assert_eq!(table[0].color, RGB8::new(0x30, 0x20, 0x10));
        assert_eq!(table[0].pad, None);
    }

    #[test]
    fn table_fits() {
        let l = fit_table(HeaderVariant::WinV3, 256, 4, 54, 54 + 1024);
        assert_eq!((l.entries, l.entry_width), (256, 4));
        assert!(l.warnings.is_empty());
    }

    #[test]
    fn overlapping_table_is_clipped() {
        let l = fit_table(HeaderVariant::Os2V1, 256, 3, 26, 26 + 30);
        assert_eq!(l.entries, 10);
        assert_eq!(l.byte_len(), 30);
        assert_eq!(l.warnings, [Warning::PaletteOverlapsBitmap { entries: 10 }]);
    }

    #[test]
    fn tiny_gap_is_not_clipped() {
        // Less than one entry of room: the offset is bogus, not the table.
        let l = fit_table(HeaderVariant::WinV3, 256, 4, 54, 54);
        assert_eq!(l.entries, 256);
        assert!(l.warnings.is_empty());
    }

    #[test]
    fn os2v2_three_byte_entries() {
        let l = fit_table(HeaderVariant::Os2V2, 16, 4, 78, 78 + 48);
        assert_eq!((l.entries, l.entry_width), (16, 3));
        assert_eq!(l.warnings, [Warning::ThreeBytePaletteEntries]);

        let l = fit_table(HeaderVariant::WinV3, 16, 4, 54, 54 + 48);
        assert_eq!((l.entries, l.entry_width), (12, 4));
    }

    #[test]
    fn bitfields_three_or_four_masks() {
        let mut d = [0u8; 16];
        d[0..4].copy_from_slice(&0xf800u32.to_le_bytes());
        d[4..8].copy_from_slice(&0x07e0u32.to_le_bytes());
        d[8..12].copy_from_slice(&0x001fu32.to_le_bytes());
        assert_eq!(decode_bitfields(&d[..12]), [0xf800, 0x07e0, 0x001f]);
        assert_eq!(decode_bitfields(&d), [0xf800, 0x07e0, 0x001f, 0]);
    }
}
