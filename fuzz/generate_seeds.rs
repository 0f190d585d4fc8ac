#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn file_header(total: u32, pixel_offset: u32) -> Vec<u8> {
    let mut d = b"BM".to_vec();
    d.extend_from_slice(&total.to_le_bytes());
    d.extend_from_slice(&[0; 4]);
    d.extend_from_slice(&pixel_offset.to_le_bytes());
    d
}

fn info_header(size: u32, width: i32, height: i32, bpp: u16, compression: u32) -> Vec<u8> {
    let mut d = vec![0u8; size as usize];
    d[0..4].copy_from_slice(&size.to_le_bytes());
    if size == 12 {
        d[4..6].copy_from_slice(&(width as u16).to_le_bytes());
        d[6..8].copy_from_slice(&(height as u16).to_le_bytes());
        d[8..10].copy_from_slice(&1u16.to_le_bytes());
        d[10..12].copy_from_slice(&bpp.to_le_bytes());
        return d;
    }
    d[4..8].copy_from_slice(&width.to_le_bytes());
    d[8..12].copy_from_slice(&height.to_le_bytes());
    d[12..14].copy_from_slice(&1u16.to_le_bytes());
    d[14..16].copy_from_slice(&bpp.to_le_bytes());
    if size >= 20 {
        d[16..20].copy_from_slice(&compression.to_le_bytes());
    }
    d
}

/// Assemble headers, color table and pixel data into a file.
fn bmp(info: Vec<u8>, palette: &[u8], bits: &[u8]) -> Vec<u8> {
    let offset = (14 + info.len() + palette.len()) as u32;
    let total = offset + bits.len() as u32;
    let mut d = file_header(total, offset);
    d.extend_from_slice(&info);
    d.extend_from_slice(palette);
    d.extend_from_slice(bits);
    d
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_inspect";
    fs::create_dir_all(dir).unwrap();
    let gray2 = [0, 0, 0, 0, 255, 255, 255, 0];

    // v3 1x1 24-bit
    let v3 = bmp(info_header(40, 1, 1, 24, 0), &[], &[0x00, 0x00, 0xff, 0x00]);
    fs::write(format!("{dir}/v3_1x1_24.bmp"), v3).unwrap();

    // v3 top-down 4x2 8-bit
    let v3_8 = bmp(info_header(40, 4, -2, 8, 0), &gray2, &[0, 1, 0, 1, 1, 0, 1, 0]);
    fs::write(format!("{dir}/v3_topdown_8.bmp"), v3_8).unwrap();

    // OS/2 1.x 8x1 1-bit, 3-byte palette
    let os2v1 = bmp(info_header(12, 8, 1, 1, 0), &[0, 0, 0, 255, 255, 255], &[0xaa, 0, 0, 0]);
    fs::write(format!("{dir}/os2v1_1bit.bmp"), os2v1).unwrap();

    // OS/2 2.x truncated 24-byte header
    let os2v2 = bmp(info_header(24, 1, 1, 24, 0), &[], &[1, 2, 3, 0]);
    fs::write(format!("{dir}/os2v2_short.bmp"), os2v2).unwrap();

    // RLE8 with run, literal, delta and EOBMP
    let rle8 = bmp(
        info_header(40, 8, 2, 8, 1),
        &gray2,
        &[3, 1, 0, 3, 0, 1, 0, 0, 0, 2, 1, 1, 0, 1],
    );
    fs::write(format!("{dir}/rle8.bmp"), rle8).unwrap();

    // RLE4
    let rle4 = bmp(info_header(40, 6, 1, 4, 2), &gray2, &[6, 0x10, 0, 1]);
    fs::write(format!("{dir}/rle4.bmp"), rle4).unwrap();

    // OS/2 RLE24
    let rle24 = bmp(
        info_header(64, 5, 1, 24, 4),
        &[],
        &[2, 0xff, 0x00, 0x00, 0, 3, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 1],
    );
    fs::write(format!("{dir}/rle24.bmp"), rle24).unwrap();

    // v5 with embedded profile
    let mut v5_info = info_header(124, 1, 1, 24, 0);
    v5_info[56..60].copy_from_slice(&0x4d42_4544u32.to_le_bytes());
    v5_info[112..116].copy_from_slice(&128u32.to_le_bytes());
    v5_info[116..120].copy_from_slice(&4u32.to_le_bytes());
    let v5 = bmp(v5_info, &[], &[1, 2, 3, 0, b'i', b'c', b'c', 0]);
    fs::write(format!("{dir}/v5_profile.bmp"), v5).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    let mut icon = b"IC".to_vec();
    icon.extend_from_slice(&[0; 12]);
    icon.extend_from_slice(&40u32.to_le_bytes());
    fs::write(format!("{dir}/icon_tag.bin"), icon).unwrap();

    println!("Generated seed corpus in {dir}/");
}
