//! Uncompressed pixel rows.

use alloc::vec::Vec;

use enough::Stop;
use rgb::RGB8;

use super::latch::{BadColor, Latch};
use super::utils::{u16_le, u32_le, unpack_indices};
use crate::error::InspectError;
use crate::report::{PixelRow, RowSamples, Warning, record};

/// Geometry of an uncompressed pixel region.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RowLayout {
    /// Absolute file offset of the region.
    pub offset: u64,
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub bit_count: u16,
    pub top_down: bool,
    pub palette_entries: usize,
}

/// Decode every row of an uncompressed region.
///
/// `d` must hold at least `stride * height` bytes. Rows are returned in
/// storage order; each carries its logical row number (0 = top).
pub(crate) fn decode_rows(
    d: &[u8],
    layout: &RowLayout,
    bad_color: &mut Latch<BadColor>,
    stop: &dyn Stop,
) -> Result<Vec<PixelRow>, InspectError> {
    let mut rows = Vec::with_capacity(layout.height);

    for (phys, chunk) in d.chunks(layout.stride).take(layout.height).enumerate() {
        if phys % 16 == 0 {
            stop.check()?;
        }
        let logical = (if layout.top_down {
            phys
        } else {
            layout.height - 1 - phys
        }) as i64;

        let samples = row_samples(chunk, layout);
        if let RowSamples::Indices { values, .. } = &samples {
            if let Some(x) = values
                .iter()
                .position(|&v| usize::from(v) >= layout.palette_entries)
            {
                bad_color.set((values[x], x as i64, logical));
            }
        }

        let mut row = PixelRow {
            offset: layout.offset + (phys * layout.stride) as u64,
            row: logical,
            samples,
            warnings: Vec::new(),
        };
        if let Some((index, x, y)) = bad_color.take_unreported() {
            record(&mut row.warnings, Warning::BadColorIndex { index, x, y });
        }
        rows.push(row);
    }
    Ok(rows)
}

fn row_samples(chunk: &[u8], layout: &RowLayout) -> RowSamples {
    let width = layout.width;
    match layout.bit_count {
        1 | 2 | 4 => RowSamples::Indices {
            depth: layout.bit_count,
            values: unpack_indices(layout.bit_count, chunk, width),
        },
        8 => RowSamples::Indices {
            depth: 8,
            values: chunk.iter().take(width).copied().collect(),
        },
        16 => RowSamples::Words((0..width).map_while(|i| u16_le(chunk, i * 2)).collect()),
        24 => RowSamples::Rgb(
            chunk
                .chunks_exact(3)
                .take(width)
                .map(|p| RGB8::new(p[2], p[1], p[0]))
                .collect(),
        ),
        _ => RowSamples::Dwords((0..width).map_while(|i| u32_le(chunk, i * 4)).collect()),
    }
}
