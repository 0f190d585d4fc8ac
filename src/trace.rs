//! Text rendering of an inspection.
//!
//! Every line that describes bytes in the file starts with the absolute
//! offset of those bytes, right-aligned in seven columns. Warnings follow
//! the section they belong to, on lines of their own.
//!
//! ```
//! use bmpinspect::{InspectRequest, Unstoppable, trace::Trace};
//!
//! let partial = InspectRequest::new(b"not a bitmap at all").inspect_partial(Unstoppable);
//! let text = Trace(&partial).to_string();
//! assert!(text.ends_with("Error: not a BMP file\n"));
//! ```

use core::fmt::{self, Write};

use rgb::RGB8;

use crate::bmp::{HeaderVariant, compression_label, file_type_name};
use crate::report::{
    BitfieldsSegment, BitmapBits, ColorTable, FileHeader, InfoHeader, PartialInspection,
    PixelPayload, PixelRow, ProfileSection, RleItem, RleKind, RleRow, RleStream, RowSamples,
    RunValue, Sample, UnusedRegion, Warning, color_space_name, intent_name,
};

/// [`Display`](fmt::Display) adapter for [`render`].
pub struct Trace<'a>(pub &'a PartialInspection);

impl fmt::Display for Trace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self.0, f)
    }
}

/// Write the trace of `partial` to `out`, ending with the end-of-file line
/// and, if the inspection failed, the error.
pub fn render<W: Write>(partial: &PartialInspection, out: &mut W) -> fmt::Result {
    let report = &partial.inspection;
    let mut r = Renderer {
        out,
        os2: report.variant.is_some_and(HeaderVariant::is_os2),
        prefix: "",
        unused: &report.unused,
    };

    if let Some(fh) = &report.file_header {
        r.file_header(fh, report.variant_name.unwrap_or("Unknown"))?;
    }
    if let Some(info) = &report.info {
        r.prefix = report.variant.map_or("", HeaderVariant::field_prefix);
        r.info_header(info, report.variant)?;
    }
    if let Some(bf) = &report.bitfields {
        r.bitfields(bf)?;
    }
    if let Some(table) = &report.color_table {
        let bit_count = report.info.as_ref().map_or(0, |i| i.bit_count);
        r.color_table(table, bit_count)?;
    }
    if let Some(bits) = &report.bitmap {
        let compressed = report.info.as_ref().is_some_and(InfoHeader::is_compressed);
        r.unused_before(bits.offset)?;
        r.bitmap(bits, compressed)?;
    }
    if let Some(profile) = &report.profile {
        r.unused_before(profile.offset)?;
        r.profile(profile)?;
    }
    r.unused_before(u64::MAX)?;

    r.heading(report.file_size, "End of file")?;
    if let Some(e) = &partial.error {
        writeln!(r.out, "Error: {e}")?;
    }
    Ok(())
}

struct Renderer<'r, W> {
    out: &'r mut W,
    os2: bool,
    /// Field name prefix of the info header ("bi", "bV5", ...).
    prefix: &'static str,
    /// Unused regions not printed yet.
    unused: &'r [UnusedRegion],
}

impl<W: Write> Renderer<'_, W> {
    fn line(&mut self, pos: u64) -> fmt::Result {
        write!(self.out, "{pos:7}: ")
    }

    fn heading(&mut self, pos: u64, title: &str) -> fmt::Result {
        self.line(pos)?;
        writeln!(self.out, "----- {title} -----")
    }

    fn note(&mut self, pos: u64, text: fmt::Arguments<'_>) -> fmt::Result {
        self.line(pos)?;
        writeln!(self.out, "({text})")
    }

    fn field(&mut self, pos: u64, name: &str, value: fmt::Arguments<'_>) -> fmt::Result {
        self.line(pos)?;
        if self.os2 {
            writeln!(self.out, "{}: {value}", os2_field_name(name))
        } else {
            writeln!(self.out, "{}{name}: {value}", self.prefix)
        }
    }

    fn warnings(&mut self, warnings: &[Warning]) -> fmt::Result {
        for w in warnings {
            writeln!(self.out, "Warning: {w}")?;
        }
        Ok(())
    }

    fn unused_before(&mut self, pos: u64) -> fmt::Result {
        let unused = self.unused;
        let n = unused.iter().take_while(|r| r.offset < pos).count();
        self.unused = &unused[n..];
        for region in &unused[..n] {
            self.line(region.offset)?;
            writeln!(self.out, "----- {} unused bytes -----", region.len)?;
        }
        Ok(())
    }

    fn file_header(&mut self, fh: &FileHeader, variant_name: &str) -> fmt::Result {
        let [t0, t1] = fh.file_type;
        self.heading(0, "FILEHEADER")?;
        self.line(0)?;
        write!(self.out, "bfType: 0x{t0:02x} 0x{t1:02x} (\"{}\")", Escaped(&fh.file_type))?;
        match file_type_name(fh.file_type) {
            Some(name) => writeln!(self.out, " = {name}")?,
            None => writeln!(self.out)?,
        }
        self.note(0, format_args!("Version detected: {variant_name}"))?;
        self.field(2, "bfSize", format_args!("{}", fh.reported_size))?;
        self.warnings(&fh.warnings)?;
        self.field(6, "bfReserved1", format_args!("{}", fh.reserved1))?;
        self.field(8, "bfReserved2", format_args!("{}", fh.reserved2))?;
        self.field(10, "bfOffBits", format_args!("{}", fh.pixel_offset))
    }

    fn info_header(&mut self, info: &InfoHeader, variant: Option<HeaderVariant>) -> fmt::Result {
        const BASE: u64 = 14;
        self.heading(BASE, "INFOHEADER")?;
        self.line(BASE)?;
        writeln!(self.out, "Info header size: {}", info.size)?;

        if !variant.is_some_and(HeaderVariant::is_v3_or_later) {
            self.field(BASE + 4, "Width", format_args!("{}", info.width))?;
            self.field(BASE + 6, "Height", format_args!("{}", info.height))?;
            self.field(BASE + 8, "Planes", format_args!("{}", info.planes))?;
            self.field(BASE + 10, "BitCount", format_args!("{}", info.bit_count))?;
            return self.warnings(&info.warnings);
        }

        self.field(BASE + 4, "Width", format_args!("{}", info.width))?;
        if info.top_down() {
            self.field(
                BASE + 8,
                "Height",
                format_args!("{} ({} pixels, top-down)", info.height, info.image_height()),
            )?;
        } else {
            self.field(BASE + 8, "Height", format_args!("{}", info.height))?;
        }
        self.field(BASE + 12, "Planes", format_args!("{}", info.planes))?;
        self.field(BASE + 14, "BitCount", format_args!("{}", info.bit_count))?;
        if let (Some(code), Some(v)) = (info.compression_code, variant) {
            self.field(
                BASE + 16,
                "Compression",
                format_args!("{code} = {}", compression_label(v, code)),
            )?;
        }
        if let Some(n) = info.size_image {
            self.field(BASE + 20, "SizeImage", format_args!("{n}"))?;
        }
        if let Some(n) = info.x_pels_per_meter {
            self.field(BASE + 24, "XPelsPerMeter", format_args!("{}", Resolution(n)))?;
        }
        if let Some(n) = info.y_pels_per_meter {
            self.field(BASE + 28, "YPelsPerMeter", format_args!("{}", Resolution(n)))?;
        }
        if let Some(n) = info.clr_used {
            self.field(BASE + 32, "ClrUsed", format_args!("{n}"))?;
        }
        if let Some(n) = info.clr_important {
            self.field(BASE + 36, "ClrImportant", format_args!("{n}"))?;
        }

        if let Some(os2) = &info.os2 {
            let words = [
                (40, "Units", os2.units),
                (42, "Reserved", os2.reserved),
                (44, "Recording", os2.recording),
                (46, "Rendering", os2.rendering),
            ];
            for (off, name, v) in words {
                if let Some(v) = v {
                    self.field(BASE + off, name, format_args!("{v}"))?;
                }
            }
            let dwords = [
                (48, "Size1", os2.size1),
                (52, "Size2", os2.size2),
                (56, "ColorEncoding", os2.color_encoding),
                (60, "Identifier", os2.identifier),
            ];
            for (off, name, v) in dwords {
                if let Some(v) = v {
                    self.field(BASE + off, name, format_args!("{v}"))?;
                }
            }
        }

        if let Some(m) = &info.masks {
            self.field(BASE + 40, "RedMask", format_args!("  {:032b}", m.red))?;
            self.field(BASE + 44, "GreenMask", format_args!("{:032b}", m.green))?;
            self.field(BASE + 48, "BlueMask", format_args!(" {:032b}", m.blue))?;
            if let Some(a) = m.alpha {
                self.field(BASE + 52, "AlphaMask", format_args!("{a:032b}"))?;
            }
        }

        if let Some(cs) = &info.color_space {
            self.line(BASE + 56)?;
            if self.os2 {
                write!(self.out, "CSType: 0x{:x}", cs.cs_type)?;
            } else {
                write!(self.out, "{}CSType: 0x{:x}", self.prefix, cs.cs_type)?;
            }
            if let Some(name) = color_space_name(cs.cs_type) {
                write!(self.out, " = {name}")?;
            }
            if !cs.valid {
                write!(self.out, " (invalid?)")?;
            }
            writeln!(self.out)?;

            let labels = ["Red:  ", "Green:", "Blue: "];
            for (i, (label, e)) in labels.iter().zip(&cs.endpoints).enumerate() {
                self.field(
                    BASE + 60 + 12 * i as u64,
                    "Endpoints",
                    format_args!("{label} X:{:.8} Y:{:.8} Z:{:.8}", e.x, e.y, e.z),
                )?;
            }
            let [red, green, blue] = cs.gamma;
            self.field(BASE + 96, "GammaRed", format_args!("  {red:.6}"))?;
            self.field(BASE + 100, "GammaGreen", format_args!("{green:.6}"))?;
            self.field(BASE + 104, "GammaBlue", format_args!(" {blue:.6}"))?;
        }

        if let Some(v5) = &info.v5 {
            if let Some(intent) = v5.intent {
                match intent_name(intent) {
                    Some(name) => {
                        self.field(BASE + 108, "Intent", format_args!("{intent} = {name}"))?
                    }
                    None => self.field(BASE + 108, "Intent", format_args!("{intent}"))?,
                }
            }
            if let Some(n) = v5.profile_data {
                self.field(BASE + 112, "ProfileData", format_args!("{n}"))?;
            }
            if let Some(n) = v5.profile_size {
                self.field(BASE + 116, "ProfileSize", format_args!("{n}"))?;
            }
            if let Some(n) = v5.reserved {
                self.field(BASE + 120, "Reserved", format_args!("{n}"))?;
            }
        }
        self.warnings(&info.warnings)
    }

    fn bitfields(&mut self, bf: &BitfieldsSegment) -> fmt::Result {
        self.heading(bf.offset, "BITFIELDS")?;
        let labels = ["Red:  ", "Green:", "Blue: ", "Alpha:"];
        for (i, (label, mask)) in labels.iter().zip(&bf.masks).enumerate() {
            self.line(bf.offset + 4 * i as u64)?;
            writeln!(self.out, "{label} {mask:032b}")?;
        }
        Ok(())
    }

    fn color_table(&mut self, table: &ColorTable, bit_count: u16) -> fmt::Result {
        let at = table.offset;
        self.heading(at, "Color table")?;
        self.note(at, format_args!("Number of colors: {}", table.entries.len()))?;
        self.warnings(&table.warnings)?;
        if table.entry_width == 4 {
            self.line(at)?;
            writeln!(self.out, "       R  G  B  x")?;
            self.line(at)?;
            writeln!(self.out, "       -- -- -- --")?;
        } else {
            self.line(at)?;
            writeln!(self.out, "       R  G  B")?;
            self.line(at)?;
            writeln!(self.out, "       -- -- --")?;
        }

        for (i, entry) in table.entries.iter().enumerate() {
            self.line(at + (i * table.entry_width) as u64)?;
            match bit_count {
                0..=4 => write!(self.out, "   {i:x} = ")?,
                5..=8 => write!(self.out, "  {i:02x} = ")?,
                // Not an indexed image; "=" would suggest it is.
                _ => write!(self.out, "[{i:3}]  ")?,
            }
            let RGB8 { r, g, b } = entry.color;
            write!(self.out, "{r:02x} {g:02x} {b:02x}")?;
            if let Some(x) = entry.pad {
                write!(self.out, " {x:02x}")?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn bitmap(&mut self, bits: &BitmapBits, compressed: bool) -> fmt::Result {
        let at = bits.offset;
        self.heading(at, "Bitmap bits")?;
        match bits.size_image {
            Some(n) => self.note(at, format_args!("Size given by SizeImage field:     {n}"))?,
            None => self.note(at, format_args!("Size given by SizeImage field:     n/a"))?,
        }
        if compressed {
            // Not predictable for compressed data.
            self.note(at, format_args!("Size calculated from width/height: n/a"))?;
        } else {
            self.note(
                at,
                format_args!("Size calculated from width/height: {}", bits.calculated_size),
            )?;
        }
        match bits.implied_size {
            Some(n) => self.note(at, format_args!("Size implied by file size:         {n}"))?,
            None => self.note(at, format_args!("Size implied by file size:         n/a"))?,
        }
        self.warnings(&bits.warnings)?;

        match &bits.payload {
            PixelPayload::Rows(rows) => {
                for row in rows {
                    self.pixel_row(row)?;
                }
            }
            PixelPayload::Rle(stream) => {
                for row in &stream.rows {
                    self.rle_row(row, stream.kind)?;
                }
                self.warnings(&stream.warnings)?;
                self.ratio(bits, stream)?;
            }
            PixelPayload::Undecodable(_) => {
                self.note(at, format_args!("Don't know how to decode this type of bitmap."))?;
            }
            PixelPayload::Skipped => {}
        }
        Ok(())
    }

    fn pixel_row(&mut self, row: &PixelRow) -> fmt::Result {
        self.line(row.offset)?;
        write!(self.out, "row {}:", row.row)?;
        match &row.samples {
            RowSamples::Indices { depth: 8, values } => {
                for v in values {
                    write!(self.out, " {v:02x}")?;
                }
            }
            RowSamples::Indices { values, .. } => {
                self.out.write_char(' ')?;
                for v in values {
                    write!(self.out, "{v:x}")?;
                }
            }
            RowSamples::Words(values) => {
                for v in values {
                    write!(self.out, " {v:04x}")?;
                }
            }
            RowSamples::Rgb(values) => {
                for &v in values {
                    write!(self.out, " {}", Hex(v))?;
                }
            }
            RowSamples::Dwords(values) => {
                for v in values {
                    write!(self.out, " {v:08x}")?;
                }
            }
        }
        writeln!(self.out)?;
        self.warnings(&row.warnings)
    }

    fn rle_row(&mut self, row: &RleRow, kind: RleKind) -> fmt::Result {
        self.line(row.offset)?;
        match row.row {
            Some(n) => write!(self.out, "row {n}:")?,
            None => write!(self.out, "row n/a:")?,
        }
        for item in &row.items {
            self.rle_item(item, kind)?;
        }
        writeln!(self.out, " [{} bytes]", row.byte_count)?;
        self.warnings(&row.warnings)
    }

    fn rle_item(&mut self, item: &RleItem, kind: RleKind) -> fmt::Result {
        match item {
            RleItem::Literal { count, pixels } => {
                write!(self.out, " u{count}{{")?;
                for (i, p) in pixels.iter().enumerate() {
                    if i > 0 && kind != RleKind::Rle4 {
                        self.out.write_char(' ')?;
                    }
                    match (p, kind) {
                        (Sample::Index(n), RleKind::Rle4) => write!(self.out, "{n:x}")?,
                        (Sample::Index(n), _) => write!(self.out, "{n:02x}")?,
                        (Sample::Rgb(c), _) => write!(self.out, "{}", Hex(*c))?,
                    }
                }
                if pixels.len() == usize::from(*count) {
                    self.out.write_char('}')?;
                }
                Ok(())
            }
            RleItem::Run { count, value } => match *value {
                RunValue::Pair(n1, n2) if *count == 1 || n1 == n2 => {
                    write!(self.out, " {count}{{{n1:x}}}")
                }
                RunValue::Pair(n1, n2) => write!(self.out, " {count}{{{n1:x}{n2:x}}}"),
                RunValue::Index(n) => write!(self.out, " {count}{{{n:02x}}}"),
                RunValue::Rgb(c) => write!(self.out, " {count}{{{}}}", Hex(c)),
                RunValue::Incomplete => write!(self.out, " {count}{{"),
            },
            RleItem::EndOfLine => write!(self.out, " EOL"),
            RleItem::EndOfBitmap => write!(self.out, " EOBMP"),
            RleItem::Delta(None) => write!(self.out, " DELTA"),
            RleItem::Delta(Some(m)) => write!(self.out, " DELTA({},{})", m.dx, m.dy),
        }
    }

    fn ratio(&mut self, bits: &BitmapBits, stream: &RleStream) -> fmt::Result {
        self.line(bits.offset + stream.consumed)?;
        write!(
            self.out,
            "(Compression ratio: {}/{} = ",
            stream.consumed, bits.calculated_size
        )?;
        match bits.compression_ratio() {
            Some(ratio) => writeln!(self.out, "{:.2}%)", ratio * 100.0),
            None => writeln!(self.out, "n/a)"),
        }
    }

    fn profile(&mut self, profile: &ProfileSection) -> fmt::Result {
        match &profile.linked_name {
            Some(name) => {
                self.heading(profile.offset, "Linked color profile")?;
                self.line(profile.offset)?;
                writeln!(self.out, "Filename: \"{}\"", Escaped(name))
            }
            None => {
                self.heading(profile.offset, "Color profile")?;
                self.note(profile.offset, format_args!("Profile size: {}", profile.size))
            }
        }
    }
}

/// OS/2 files have their own names for some fields, and no prefix.
fn os2_field_name(name: &str) -> &str {
    match name {
        "bfSize" => "cbSize",
        "bfReserved1" => "xHotspot",
        "bfReserved2" => "yHotspot",
        "bfOffBits" => "offBits",
        // OS/2 2.x has a separate Units field, so these are not per meter.
        "XPelsPerMeter" => "XResolution",
        "YPelsPerMeter" => "YResolution",
        other => other,
    }
}

/// Pixels per meter, with the equivalent DPI when nonzero.
struct Resolution(i32);

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        if self.0 != 0 {
            write!(f, " ({:.2} dpi)", f64::from(self.0) * 0.0254)?;
        }
        Ok(())
    }
}

/// An RGB triple as `rrggbb`.
struct Hex(RGB8);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let RGB8 { r, g, b } = self.0;
        write!(f, "{r:02x}{g:02x}{b:02x}")
    }
}

/// Bytes as printable ASCII, with `\` and `"` escaped and everything else as
/// `\xNN`.
struct Escaped<'a>(&'a [u8]);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            match b {
                b'\\' | b'"' => write!(f, "\\{}", char::from(b))?,
                32..=126 => f.write_char(char::from(b))?,
                _ => write!(f, "\\x{b:02x}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use enough::Unstoppable;

    /// A 2x2 24-bit Windows v3 file: bottom row blue, green; top row red, white.
    fn tiny_v3() -> Vec<u8> {
        let mut d = vec![0u8; 54];
        d[0..2].copy_from_slice(b"BM");
        d[2..6].copy_from_slice(&70u32.to_le_bytes());
        d[10..14].copy_from_slice(&54u32.to_le_bytes());
        d[14..18].copy_from_slice(&40u32.to_le_bytes());
        d[18..22].copy_from_slice(&2i32.to_le_bytes());
        d[22..26].copy_from_slice(&2i32.to_le_bytes());
        d[26..28].copy_from_slice(&1u16.to_le_bytes());
        d[28..30].copy_from_slice(&24u16.to_le_bytes());
        d.extend_from_slice(&[0xff, 0, 0, 0, 0xff, 0, 0, 0]);
        d.extend_from_slice(&[0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0]);
        d
    }

    fn trace_of(data: &[u8]) -> String {
        let partial = crate::bmp::inspect(data, &Limits::default(), true, &Unstoppable);
        Trace(&partial).to_string()
    }

    #[test]
    fn v3_trace_lines() {
        let text = trace_of(&tiny_v3());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "      0: ----- FILEHEADER -----");
        assert_eq!(lines[1], "      0: bfType: 0x42 0x4d (\"BM\") = Bitmap");
        assert_eq!(lines[2], "      0: (Version detected: Windows BMP v3)");
        assert_eq!(lines[3], "      2: bfSize: 70");
        assert_eq!(lines[6], "     10: bfOffBits: 54");
        assert_eq!(lines[7], "     14: ----- INFOHEADER -----");
        assert!(text.contains("     18: biWidth: 2\n"));
        assert!(text.contains("     30: biCompression: 0 = BI_RGB (uncompressed)\n"));
        assert!(text.contains("     54: (Size calculated from width/height: 16)\n"));
        assert!(text.contains("     54: row 1: 0000ff 00ff00\n"));
        assert!(text.contains("     62: row 0: ff0000 ffffff\n"));
        assert!(text.ends_with("     70: ----- End of file -----\n"));
        assert!(!text.contains("Warning"));
        assert!(!text.contains("Error"));
    }

    #[test]
    fn top_down_height_is_annotated() {
        let mut d = tiny_v3();
        d[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let text = trace_of(&d);
        assert!(text.contains("     22: biHeight: -2 (2 pixels, top-down)\n"));
        assert!(text.contains("     54: row 0: 0000ff 00ff00\n"));
    }

    #[test]
    fn error_follows_end_of_file() {
        let mut d = tiny_v3();
        d[10..14].copy_from_slice(&20u32.to_le_bytes());
        let text = trace_of(&d);
        assert!(text.ends_with(
            "     70: ----- End of file -----\nError: bad bfOffBits value 20 (expected 54..=70)\n"
        ));
    }

    #[test]
    fn trailing_bytes_are_unused() {
        let mut d = tiny_v3();
        d.extend_from_slice(&[0; 5]);
        let text = trace_of(&d);
        assert!(text.contains("     70: ----- 5 unused bytes -----\n"));
        assert!(text.contains(
            "Warning: Reported file size (70) does not equal actual file size (75)\n"
        ));
    }

    #[test]
    fn rle_items() {
        let mut out = String::new();
        let row = RleRow {
            offset: 1078,
            row: Some(3),
            items: vec![
                RleItem::Run {
                    count: 4,
                    value: RunValue::Index(0x1a),
                },
                RleItem::Literal {
                    count: 3,
                    pixels: vec![Sample::Index(1), Sample::Index(2), Sample::Index(3)],
                },
                RleItem::Delta(Some(crate::report::DeltaMove { dx: 2, dy: 0 })),
                RleItem::EndOfLine,
            ],
            byte_count: 12,
            warnings: Vec::new(),
        };
        let mut r = Renderer {
            out: &mut out,
            os2: false,
            prefix: "",
            unused: &[],
        };
        r.rle_row(&row, RleKind::Rle8).unwrap();
        assert_eq!(
            out,
            "   1078: row 3: 4{1a} u3{01 02 03} DELTA(2,0) EOL [12 bytes]\n"
        );

        let mut out = String::new();
        let mut r = Renderer {
            out: &mut out,
            os2: false,
            prefix: "",
            unused: &[],
        };
        let row = RleRow {
            offset: 0,
            row: None,
            items: vec![
                RleItem::Run {
                    count: 5,
                    value: RunValue::Pair(1, 2),
                },
                RleItem::Run {
                    count: 1,
                    value: RunValue::Pair(7, 0),
                },
                RleItem::Literal {
                    count: 5,
                    pixels: vec![Sample::Index(0xa), Sample::Index(0xb)],
                },
            ],
            byte_count: 6,
            warnings: vec![Warning::MissingEndOfBitmap],
        };
        r.rle_row(&row, RleKind::Rle4).unwrap();
        assert_eq!(
            out,
            "      0: row n/a: 5{12} 1{7} u5{ab [6 bytes]\n\
             Warning: Compressed data ended without an EOBMP code\n"
        );
    }

    #[test]
    fn linked_profile_name_is_escaped() {
        assert_eq!(
            Escaped(b"C:\\x \"y\"\x00\xe9").to_string(),
            "C:\\\\x \\\"y\\\"\\x00\\xe9"
        );
    }

    #[test]
    fn os2_names() {
        assert_eq!(os2_field_name("bfOffBits"), "offBits");
        assert_eq!(os2_field_name("XPelsPerMeter"), "XResolution");
        assert_eq!(os2_field_name("Width"), "Width");
        assert_eq!(Resolution(2835).to_string(), "2835 (72.01 dpi)");
        assert_eq!(Resolution(0).to_string(), "0");
    }
}
