//! End-to-end decode tests over synthesized ILBM containers.

use zenilbm::*;

// ── container builders ───────────────────────────────────────────────

fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0); // chunks start on even offsets
    }
    out
}

fn form(chunks: &[Vec<u8>]) -> Vec<u8> {
    let inner = 4 + chunks.iter().map(Vec::len).sum::<usize>();
    let mut out = Vec::new();
    out.extend_from_slice(b"FORM");
    out.extend_from_slice(&(inner as u32).to_be_bytes());
    out.extend_from_slice(b"ILBM");
    for c in chunks {
        out.extend_from_slice(c);
    }
    out
}

fn bmhd(
    width: u16,
    height: u16,
    bitplanes: u8,
    masking: u8,
    compression: u8,
    transparent: u16,
) -> Vec<u8> {
    let mut p = vec![0u8; 20];
    p[0..2].copy_from_slice(&width.to_be_bytes());
    p[2..4].copy_from_slice(&height.to_be_bytes());
    p[8] = bitplanes;
    p[9] = masking;
    p[10] = compression;
    p[12..14].copy_from_slice(&transparent.to_be_bytes());
    p[14] = 1;
    p[15] = 1;
    chunk(b"BMHD", &p)
}

fn cmap(colors: &[[u8; 3]]) -> Vec<u8> {
    chunk(b"CMAP", &colors.concat())
}

fn body(data: &[u8]) -> Vec<u8> {
    chunk(b"BODY", data)
}

fn gray_colors(n: usize) -> Vec<[u8; 3]> {
    (0..n).map(|i| [(i * 16) as u8; 3]).collect()
}

// ── pixel pipeline ───────────────────────────────────────────────────

#[test]
fn one_plane_uncompressed_pattern() {
    // 0b10101010 across one plane: even columns hit palette entry 1
    let data = form(&[
        bmhd(8, 1, 1, 0, 0, 0),
        cmap(&[[0, 0, 0], [255, 255, 255]]),
        body(&[0b1010_1010, 0x00]),
    ]);

    let decoded = decode(&data, Unstoppable).unwrap();
    assert_eq!(decoded.width, 8);
    assert_eq!(decoded.height, 1);

    let mut expected = Vec::new();
    for x in 0..8 {
        if x % 2 == 0 {
            expected.extend_from_slice(&[255, 255, 255, 255]);
        } else {
            expected.extend_from_slice(&[0, 0, 0, 255]);
        }
    }
    assert_eq!(decoded.pixels(), &expected[..]);
}

#[test]
fn byterun1_matches_uncompressed() {
    let colors = gray_colors(2);
    let plain = form(&[
        bmhd(16, 2, 1, 0, 0, 0),
        cmap(&colors),
        body(&[0xFF, 0x0F, 0xAA, 0xAA]),
    ]);
    let packed = form(&[
        bmhd(16, 2, 1, 0, 1, 0),
        cmap(&colors),
        // row 0: literal [0xFF, 0x0F]; row 1: repeat 0xAA twice
        body(&[0x01, 0xFF, 0x0F, 0xFF, 0xAA]),
    ]);

    let a = decode(&plain, Unstoppable).unwrap();
    let b = decode(&packed, Unstoppable).unwrap();
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn multi_plane_indices_resolve_through_palette() {
    // columns 0..4 resolve to indices 3, 1, 2, 0
    let data = form(&[
        bmhd(4, 1, 2, 0, 0, 0),
        cmap(&[[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]),
        body(&[0b1100_0000, 0x00, 0b1010_0000, 0x00]),
    ]);

    let decoded = decode(&data, Unstoppable).unwrap();
    assert_eq!(
        decoded.pixels(),
        &[
            0, 0, 255, 255, // index 3
            255, 0, 0, 255, // index 1
            0, 255, 0, 255, // index 2
            0, 0, 0, 255, // index 0
        ]
    );
}

#[test]
fn color_key_transparency() {
    // 3 planes, transparent color 5; column 0 resolves to 5, column 1 to 3
    let plane0 = [0b1100_0000u8, 0x00]; // indices with bit 0: columns 0, 1
    let plane1 = [0b0100_0000u8, 0x00]; // bit 1: column 1
    let plane2 = [0b1000_0000u8, 0x00]; // bit 2: column 0
    let mut rows = Vec::new();
    rows.extend_from_slice(&plane0);
    rows.extend_from_slice(&plane1);
    rows.extend_from_slice(&plane2);

    let colors = gray_colors(8);
    let data = form(&[bmhd(8, 1, 3, 2, 0, 5), cmap(&colors), body(&rows)]);

    let decoded = decode(&data, Unstoppable).unwrap();
    let px = decoded.pixels();

    // column 0: index 5 == transparent color
    assert_eq!(&px[0..4], &[0, 0, 0, 0]);
    // column 1: index 3, opaque
    assert_eq!(&px[4..8], &[48, 48, 48, 255]);
    // remaining columns: index 0, opaque
    for x in 2..8 {
        assert_eq!(&px[x * 4..x * 4 + 4], &[0, 0, 0, 255], "column {x}");
    }
}

#[test]
fn mask_plane_transparency() {
    // 2 color planes + mask plane. Raw indices per column:
    //   0: mask only (4)      -> transparent
    //   1: mask + color 1 (5) -> opaque, palette entry 1
    //   2: color 2, no mask   -> opaque, palette entry 2
    //   3: nothing            -> opaque, palette entry 0
    let plane0 = [0b0100_0000u8, 0x00];
    let plane1 = [0b0010_0000u8, 0x00];
    let mask = [0b1100_0000u8, 0x00];
    let mut rows = Vec::new();
    rows.extend_from_slice(&plane0);
    rows.extend_from_slice(&plane1);
    rows.extend_from_slice(&mask);

    let data = form(&[
        bmhd(4, 1, 2, 1, 0, 0),
        cmap(&[[10, 10, 10], [20, 20, 20], [30, 30, 30], [40, 40, 40]]),
        body(&rows),
    ]);

    let decoded = decode(&data, Unstoppable).unwrap();
    assert_eq!(
        decoded.pixels(),
        &[
            0, 0, 0, 0, // mask bit alone
            20, 20, 20, 255, // mask bit stripped before lookup
            30, 30, 30, 255, // no mask bit
            10, 10, 10, 255, // index 0
        ]
    );
}

#[test]
fn width_not_on_word_boundary() {
    // width 17 -> 4 bytes per plane row; last 15 bits are stride padding
    let mut row = vec![0u8; 4];
    row[0] = 0xFF;
    row[1] = 0xFF;
    row[2] = 0xFF; // bit for column 16 plus padding bits
    let data = form(&[bmhd(17, 1, 1, 0, 0, 0), cmap(&gray_colors(2)), body(&row)]);

    let decoded = decode(&data, Unstoppable).unwrap();
    assert_eq!(decoded.width, 17);
    assert_eq!(decoded.pixels().len(), 17 * 4);
    for x in 0..17 {
        assert_eq!(decoded.pixels()[x * 4], 16, "column {x}");
    }
}

// ── session driving ──────────────────────────────────────────────────

#[test]
fn scanline_exhaustion() {
    let data = form(&[
        bmhd(8, 3, 1, 0, 0, 0),
        cmap(&gray_colors(2)),
        body(&[0xFF, 0x00, 0x00, 0x00, 0xAA, 0x00]),
    ]);

    let mut raster = RgbaRaster::new();
    let mut session = DecodeRequest::new(&data)
        .begin(&mut raster, &Unstoppable)
        .unwrap();

    assert_eq!(session.width(), 8);
    assert_eq!(session.height(), 3);

    for _ in 0..3 {
        assert!(session.decode_next_row().unwrap());
    }
    assert_eq!(session.rows_decoded(), 3);

    // exhausted: no more rows, repeatedly
    assert!(!session.decode_next_row().unwrap());
    assert!(!session.decode_next_row().unwrap());
    assert_eq!(session.rows_decoded(), 3);
}

#[test]
fn session_exposes_header_and_palette() {
    let data = form(&[
        bmhd(8, 1, 2, 0, 1, 0),
        cmap(&gray_colors(4)),
        body(&[0x01, 0x00, 0x00, 0x00]),
    ]);

    let mut raster = RgbaRaster::new();
    let session = DecodeRequest::new(&data)
        .begin(&mut raster, &Unstoppable)
        .unwrap();

    assert_eq!(session.header().bitplanes, 2);
    assert_eq!(session.header().compression, Compression::ByteRun1);
    assert_eq!(session.palette().len(), 4);
    assert_eq!(session.display_mode(), None);
}

#[test]
fn truncated_body_fails_mid_decode() {
    // 2 rows declared, BODY holds only one
    let data = form(&[
        bmhd(8, 2, 1, 0, 0, 0),
        cmap(&gray_colors(2)),
        body(&[0xFF, 0x00]),
    ]);

    let mut raster = RgbaRaster::new();
    let mut session = DecodeRequest::new(&data)
        .begin(&mut raster, &Unstoppable)
        .unwrap();

    assert!(session.decode_next_row().unwrap());
    assert!(matches!(
        session.decode_next_row(),
        Err(IlbmError::UnexpectedEof)
    ));
}

// ── probe, limits, views ─────────────────────────────────────────────

#[test]
fn probe_needs_no_palette_or_body() {
    let data = form(&[
        chunk(b"ANNO", b"made by a test"),
        bmhd(320, 200, 5, 2, 1, 9),
    ]);

    let info = probe(&data).unwrap();
    assert_eq!(info.width, 320);
    assert_eq!(info.height, 200);
    assert_eq!(info.bitplanes, 5);
    assert_eq!(info.masking, Masking::ColorKey(9));
    assert_eq!(info.compression, Compression::ByteRun1);
    assert_eq!(info.row_bytes, 40);

    // a full decode of the same bytes still requires CMAP
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(IlbmError::MissingChunk { .. })
    ));
}

#[test]
fn limits_reject_large() {
    let data = form(&[
        bmhd(8, 2, 1, 0, 0, 0),
        cmap(&gray_colors(2)),
        body(&[0xFF, 0x00, 0x00, 0x00]),
    ]);

    let limits = Limits {
        max_pixels: Some(1), // only 1 pixel allowed
        ..Default::default()
    };

    let result = DecodeRequest::new(&data)
        .with_limits(&limits)
        .decode(Unstoppable);
    match result.unwrap_err() {
        IlbmError::LimitExceeded(_) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

#[cfg(feature = "rgb")]
#[test]
fn typed_rgba_view() {
    let data = form(&[
        bmhd(8, 1, 1, 0, 0, 0),
        cmap(&[[0, 0, 0], [255, 255, 255]]),
        body(&[0b1000_0000, 0x00]),
    ]);

    let decoded = decode(&data, Unstoppable).unwrap();
    let pixels = decoded.as_rgba();
    assert_eq!(pixels.len(), 8);
    assert_eq!((pixels[0].r, pixels[0].g, pixels[0].b, pixels[0].a), (255, 255, 255, 255));
    assert_eq!((pixels[1].r, pixels[1].g, pixels[1].b, pixels[1].a), (0, 0, 0, 255));
}
