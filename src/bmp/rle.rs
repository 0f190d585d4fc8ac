//! RLE4 / RLE8 / RLE24 stream decoder.
//!
//! The stream is read two bytes at a time. A pair is either a compressed run
//! (count, value), an escape (0, code), or data belonging to whatever the
//! previous pair started: literal pixels, delta offsets, or the second half
//! of a four-byte RLE24 run. Nothing is written to a pixel buffer; the
//! decoder records the items it sees, grouped by image row, and checks the
//! pixels it can place without expanding runs.

use alloc::vec::Vec;

use enough::Stop;
use rgb::RGB8;

use super::latch::{BadColor, Latch};
use crate::error::InspectError;
use crate::report::{
    DeltaMove, RleItem, RleKind, RleRow, RleStream, RunValue, Sample, Warning, record,
};

/// What the next byte pair means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Expecting a run or an escape.
    Idle,
    /// Inside a literal run with this many pixels still to come.
    LiteralRun { remaining: u8 },
    /// The pair holds the (dx, dy) of a delta escape.
    DeltaPending,
    /// The pair holds green and red of an RLE24 run.
    Rle24Completion { count: u8, blue: u8 },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RleParams {
    /// Absolute file offset of the stream.
    pub offset: u64,
    pub kind: RleKind,
    pub width: i64,
    pub height: i64,
    pub palette_entries: usize,
}

struct Decoder<'a> {
    params: RleParams,
    state: State,
    x: i64,
    y: i64,
    /// RLE24 literal bytes not yet assembled into a pixel.
    acc: [u8; 4],
    acc_used: usize,
    bad_pos: Latch<(i64, i64)>,
    bad_color: &'a mut Latch<BadColor>,
    current: Option<RleRow>,
    rows: Vec<RleRow>,
    warnings: Vec<Warning>,
}

/// Decode an RLE stream. `d` runs from the start of the pixel data to the
/// end of the file; decoding stops at the end-of-bitmap code.
pub(crate) fn decode_rle(
    d: &[u8],
    params: RleParams,
    bad_color: &mut Latch<BadColor>,
    stop: &dyn Stop,
) -> Result<RleStream, InspectError> {
    let mut dec = Decoder {
        params,
        state: State::Idle,
        x: 0,
        // Compressed images are always bottom-up.
        y: params.height - 1,
        acc: [0; 4],
        acc_used: 0,
        bad_pos: Latch::default(),
        bad_color,
        current: None,
        rows: Vec::new(),
        warnings: Vec::new(),
    };

    let mut pos = 0usize;
    let mut terminated = false;
    let mut pairs = 0u32;

    loop {
        let (Some(&b1), Some(&b2)) = (d.get(pos), d.get(pos + 1)) else {
            dec.end_row();
            record(&mut dec.warnings, Warning::MissingEndOfBitmap);
            break;
        };
        pairs = pairs.wrapping_add(1);
        if pairs % 1024 == 0 {
            stop.check()?;
        }

        dec.begin_row(params.offset + pos as u64);
        pos += 2;
        if let Some(row) = dec.current.as_mut() {
            row.byte_count += 2;
        }

        if dec.pair(b1, b2) {
            terminated = true;
            break;
        }
    }

    log::trace!(
        "{:?} stream: {} rows, {} bytes, terminated: {}",
        params.kind,
        dec.rows.len(),
        pos,
        terminated
    );
    Ok(RleStream {
        kind: params.kind,
        rows: dec.rows,
        consumed: pos as u64,
        terminated,
        warnings: dec.warnings,
    })
}

impl Decoder<'_> {
    fn begin_row(&mut self, offset: u64) {
        if self.current.is_none() {
            self.current = Some(RleRow {
                offset,
                row: (self.y >= 0).then_some(self.y),
                items: Vec::new(),
                byte_count: 0,
                warnings: Vec::new(),
            });
        }
    }

    /// Close the open row and attach any pending warnings to it.
    fn end_row(&mut self) {
        let mut pending = Vec::new();
        if let Some((x, y)) = self.bad_pos.take_unreported() {
            record(&mut pending, Warning::OutOfBoundsPixel { x, y });
        }
        if let Some((index, x, y)) = self.bad_color.take_unreported() {
            record(&mut pending, Warning::BadColorIndex { index, x, y });
        }
        match self.current.take() {
            Some(mut row) => {
                row.warnings.extend(pending);
                self.rows.push(row);
            }
            None => self.warnings.extend(pending),
        }
    }

    fn push(&mut self, item: RleItem) {
        if let Some(row) = self.current.as_mut() {
            row.items.push(item);
        }
    }

    fn last_item(&mut self) -> Option<&mut RleItem> {
        self.current.as_mut().and_then(|row| row.items.last_mut())
    }

    /// Check the pixel at the current position. `index` is `None` for RLE24
    /// pixels and for positions whose value is not known.
    fn check(&mut self, index: Option<u8>) {
        if self.x >= self.params.width || self.y < 0 {
            self.bad_pos.set((self.x, self.y));
        }
        if self.params.kind == RleKind::Rle24 {
            return;
        }
        if let Some(n) = index {
            if usize::from(n) >= self.params.palette_entries {
                self.bad_color.set((n, self.x, self.y));
            }
        }
    }

    /// Place one literal pixel and advance.
    fn literal_pixel(&mut self, sample: Sample) {
        let index = match sample {
            Sample::Index(n) => Some(n),
            Sample::Rgb(_) => None,
        };
        self.check(index);
        self.x += 1;
        if let Some(RleItem::Literal { pixels, .. }) = self.last_item() {
            pixels.push(sample);
        }
    }

    /// Handle one byte pair. Returns true at the end-of-bitmap code.
    fn pair(&mut self, b1: u8, b2: u8) -> bool {
        match self.state {
            State::LiteralRun { remaining } => {
                let remaining = self.literal(remaining, b1, b2);
                self.state = if remaining > 0 {
                    State::LiteralRun { remaining }
                } else {
                    State::Idle
                };
            }
            State::DeltaPending => {
                if let Some(RleItem::Delta(m)) = self.last_item() {
                    *m = Some(DeltaMove { dx: b1, dy: b2 });
                }
                self.x += i64::from(b1);
                self.y -= i64::from(b2);
                if b2 > 0 {
                    self.end_row();
                }
                self.state = State::Idle;
            }
            State::Rle24Completion { count, blue } => {
                if let Some(RleItem::Run { value, .. }) = self.last_item() {
                    *value = RunValue::Rgb(RGB8::new(b2, b1, blue));
                }
                self.x += i64::from(count) - 1;
                self.check(None);
                self.x += 1;
                self.state = State::Idle;
            }
            State::Idle if b1 == 0 => return self.escape(b2),
            State::Idle => self.run(b1, b2),
        }
        false
    }

    fn escape(&mut self, code: u8) -> bool {
        match code {
            0 => {
                self.push(RleItem::EndOfLine);
                self.end_row();
                self.y -= 1;
                self.x = 0;
            }
            1 => {
                self.push(RleItem::EndOfBitmap);
                self.end_row();
                return true;
            }
            2 => {
                self.push(RleItem::Delta(None));
                self.state = State::DeltaPending;
            }
            count => {
                self.push(RleItem::Literal {
                    count,
                    pixels: Vec::with_capacity(usize::from(count)),
                });
                self.acc_used = 0;
                self.state = State::LiteralRun { remaining: count };
            }
        }
        false
    }

    /// Consume one pair of literal data; returns the pixels still to come.
    fn literal(&mut self, mut remaining: u8, b1: u8, b2: u8) -> u8 {
        match self.params.kind {
            RleKind::Rle8 => {
                for n in [b1, b2] {
                    if remaining == 0 {
                        break;
                    }
                    self.literal_pixel(Sample::Index(n));
                    remaining -= 1;
                }
            }
            RleKind::Rle4 => {
                for n in [b1 >> 4, b1 & 0x0f, b2 >> 4, b2 & 0x0f] {
                    if remaining == 0 {
                        break;
                    }
                    self.literal_pixel(Sample::Index(n));
                    remaining -= 1;
                }
            }
            RleKind::Rle24 => {
                self.acc[self.acc_used] = b1;
                self.acc[self.acc_used + 1] = b2;
                self.acc_used += 2;
                if self.acc_used >= 3 {
                    let [b, g, r, spill] = self.acc;
                    self.literal_pixel(Sample::Rgb(RGB8::new(r, g, b)));
                    remaining -= 1;
                    if self.acc_used == 4 {
                        self.acc[0] = spill;
                    }
                    self.acc_used -= 3;
                }
                if remaining == 0 {
                    // Drop the padding byte, if any.
                    self.acc_used = 0;
                }
            }
        }
        remaining
    }

    fn run(&mut self, count: u8, value: u8) {
        match self.params.kind {
            RleKind::Rle8 => {
                self.push(RleItem::Run {
                    count,
                    value: RunValue::Index(value),
                });
                self.check(Some(value));
                self.x += i64::from(count) - 1;
                self.check(Some(value));
                self.x += 1;
            }
            RleKind::Rle4 => {
                let (n1, n2) = (value >> 4, value & 0x0f);
                self.push(RleItem::Run {
                    count,
                    value: RunValue::Pair(n1, n2),
                });
                self.check(Some(n1));
                self.x += 1;
                if count > 1 {
                    self.check(Some(n2));
                    self.x += 1;
                    if count > 2 {
                        self.x += i64::from(count) - 3;
                        // Pixels alternate n1, n2, n1, ...
                        let last = if (count - 1) % 2 == 0 { n1 } else { n2 };
                        self.check(Some(last));
                        self.x += 1;
                    }
                }
            }
            RleKind::Rle24 => {
                self.push(RleItem::Run {
                    count,
                    value: RunValue::Incomplete,
                });
                self.check(None);
                self.state = State::Rle24Completion { count, blue: value };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use enough::Unstoppable;

    fn params(kind: RleKind, width: i64, height: i64, palette_entries: usize) -> RleParams {
        RleParams {
            offset: 1078,
            kind,
            width,
            height,
            palette_entries,
        }
    }

    fn decode(d: &[u8], p: RleParams) -> RleStream {
        decode_rle(d, p, &mut Latch::default(), &Unstoppable).unwrap()
    }

    #[test]
    fn rle8_runs_and_eol() {
        let d = [3, 0x07, 0, 0, 0, 3, 1, 2, 3, 0, 0, 1];
        let s = decode(&d, params(RleKind::Rle8, 3, 2, 256));
        assert!(s.terminated);
        assert_eq!(s.consumed, 12);
        assert_eq!(s.rows.len(), 2);

        assert_eq!(s.rows[0].row, Some(1));
        assert_eq!(s.rows[0].offset, 1078);
        assert_eq!(s.rows[0].byte_count, 4);
        assert_eq!(
            s.rows[0].items,
            [
                RleItem::Run {
                    count: 3,
                    value: RunValue::Index(7)
                },
                RleItem::EndOfLine
            ]
        );

        assert_eq!(s.rows[1].row, Some(0));
        assert_eq!(s.rows[1].offset, 1082);
        assert_eq!(s.rows[1].byte_count, 8);
        assert_eq!(
            s.rows[1].items,
            [
                RleItem::Literal {
                    count: 3,
                    pixels: vec![Sample::Index(1), Sample::Index(2), Sample::Index(3)]
                },
                RleItem::EndOfBitmap
            ]
        );
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn literal_lengths_consume_whole_words() {
        // RLE8: N pixels take ceil(N/2)*2 bytes.
        for n in 3u8..=9 {
            let mut d = vec![0, n];
            d.extend((0..n).map(|i| i % 4));
            if n % 2 == 1 {
                d.push(0);
            }
            d.extend_from_slice(&[0, 1]);
            let s = decode(&d, params(RleKind::Rle8, 16, 1, 4));
            assert!(s.terminated, "rle8 n={n}");
            let RleItem::Literal { pixels, .. } = &s.rows[0].items[0] else {
                panic!("expected literal");
            };
            assert_eq!(pixels.len(), usize::from(n));
            assert_eq!(s.consumed as usize, d.len());
        }

        // RLE4: N pixels take ceil(N/4)*2 bytes.
        for n in 3u8..=9 {
            let mut d = vec![0, n];
            d.extend(core::iter::repeat_n(0x12, usize::from(n).div_ceil(4) * 2));
            d.extend_from_slice(&[0, 1]);
            let s = decode(&d, params(RleKind::Rle4, 16, 1, 16));
            assert!(s.terminated, "rle4 n={n}");
            let RleItem::Literal { pixels, .. } = &s.rows[0].items[0] else {
                panic!("expected literal");
            };
            assert_eq!(pixels.len(), usize::from(n));
            assert_eq!(pixels[1], Sample::Index(2));
        }
    }

    #[test]
    fn rle24_literal_and_run() {
        // Literal of 3 pixels: 9 bytes + 1 pad, then a run of 2 pixels.
        let d = [
            0, 3, //
            1, 2, 3, 4, 5, 6, 7, 8, 9, 0, //
            2, 0x10, 0x20, 0x30, //
            0, 1,
        ];
        let s = decode(&d, params(RleKind::Rle24, 5, 1, 0));
        assert!(s.terminated);
        assert_eq!(
            s.rows[0].items,
            [
                RleItem::Literal {
                    count: 3,
                    pixels: vec![
                        Sample::Rgb(RGB8::new(3, 2, 1)),
                        Sample::Rgb(RGB8::new(6, 5, 4)),
                        Sample::Rgb(RGB8::new(9, 8, 7)),
                    ]
                },
                RleItem::Run {
                    count: 2,
                    value: RunValue::Rgb(RGB8::new(0x30, 0x20, 0x10))
                },
                RleItem::EndOfBitmap
            ]
        );
        assert!(s.rows[0].warnings.is_empty());
    }

    #[test]
    fn rle24_odd_literal_is_padded() {
        // 5 pixels: 15 bytes plus one pad byte.
        let mut d = vec![0, 5];
        d.extend(0u8..16);
        d.extend_from_slice(&[0, 1]);
        let s = decode(&d, params(RleKind::Rle24, 5, 1, 0));
        assert!(s.terminated);
        assert_eq!(s.consumed, 20);
        let RleItem::Literal { count, pixels } = &s.rows[0].items[0] else {
            panic!("expected literal");
        };
        assert_eq!(*count, 5);
        assert_eq!(pixels.len(), 5);
        assert_eq!(pixels[4], Sample::Rgb(RGB8::new(14, 13, 12)));
        assert_eq!(s.rows[0].items[1], RleItem::EndOfBitmap);
    }

    #[test]
    fn missing_end_of_bitmap() {
        let d = [2, 0x01, 0];
        let s = decode(&d, params(RleKind::Rle8, 2, 1, 2));
        assert!(!s.terminated);
        assert_eq!(s.consumed, 2);
        assert_eq!(s.rows.len(), 1);
        assert_eq!(s.rows[0].byte_count, 2);
        assert_eq!(s.warnings, [Warning::MissingEndOfBitmap]);
    }

    #[test]
    fn bad_color_latches_first_only() {
        // Two palette entries; index 5 at (1,1), then index 9 at (0,0).
        let d = [1, 0, 1, 5, 0, 0, 1, 9, 0, 1];
        let mut latch = Latch::default();
        let s = decode_rle(&d, params(RleKind::Rle8, 2, 2, 2), &mut latch, &Unstoppable).unwrap();
        assert_eq!(
            s.rows[0].warnings,
            [Warning::BadColorIndex {
                index: 5,
                x: 1,
                y: 1
            }]
        );
        assert!(s.rows[1].warnings.is_empty());
    }

    #[test]
    fn run_past_width_is_out_of_bounds() {
        // A run of 5 in a 4-pixel row; the last pixel lands at x=4.
        let d = [5, 0, 0, 1];
        let s = decode(&d, params(RleKind::Rle8, 4, 1, 256));
        assert_eq!(s.rows[0].warnings, [Warning::OutOfBoundsPixel { x: 4, y: 0 }]);
    }

    #[test]
    fn rle4_run_checks_the_last_pixel_nibble() {
        // 3 pixels of (0, 7): the second one is out of range.
        let d = [3, 0x07, 0, 1];
        let s = decode(&d, params(RleKind::Rle4, 8, 1, 4));
        assert_eq!(
            s.rows[0].warnings,
            [Warning::BadColorIndex {
                index: 7,
                x: 1,
                y: 0
            }]
        );
        // 4 pixels of (7, 0): the first one already is.
        let d = [4, 0x70, 0, 1];
        let s = decode(&d, params(RleKind::Rle4, 8, 1, 4));
        assert_eq!(
            s.rows[0].warnings,
            [Warning::BadColorIndex {
                index: 7,
                x: 0,
                y: 0
            }]
        );
    }

    #[test]
    fn delta_moves_rows() {
        // 4x3: run on the bottom row, delta (1,2) to the top row, run.
        let d = [1, 0, 0, 2, 1, 2, 2, 1, 0, 1];
        let s = decode(&d, params(RleKind::Rle8, 4, 3, 2));
        assert!(s.terminated);
        assert_eq!(s.rows.len(), 2);
        assert_eq!(s.rows[0].row, Some(2));
        assert_eq!(
            s.rows[0].items[1],
            RleItem::Delta(Some(DeltaMove { dx: 1, dy: 2 }))
        );
        assert_eq!(s.rows[0].byte_count, 6);
        assert_eq!(s.rows[1].row, Some(0));
        assert_eq!(s.rows[1].offset, 1078 + 6);
        assert!(s.rows.iter().all(|r| r.warnings.is_empty()));
    }

    #[test]
    fn rows_below_the_image_have_no_number() {
        let d = [0, 0, 1, 0, 0, 1];
        let s = decode(&d, params(RleKind::Rle8, 1, 1, 1));
        assert_eq!(s.rows[0].row, Some(0));
        assert_eq!(s.rows[1].row, None);
        assert_eq!(s.rows[1].warnings, [Warning::OutOfBoundsPixel { x: 0, y: -1 }]);
    }

    #[test]
    fn empty_stream() {
        let s = decode(&[], params(RleKind::Rle8, 1, 1, 1));
        assert!(s.rows.is_empty());
        assert_eq!(s.consumed, 0);
        assert_eq!(s.warnings, [Warning::MissingEndOfBitmap]);
    }
}
