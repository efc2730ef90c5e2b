use image::{DynamicImage, Rgba, RgbaImage};
use jigsaw_atlas_core::compositing::{compose_piece, composite_atlas};
use jigsaw_atlas_core::error::JigsawError;
use jigsaw_atlas_core::mask::{DirMasks, MaskSource, MemoryMasks, mask_key};
use jigsaw_atlas_core::model::{EdgeTabs, Piece, PieceKind};
use jigsaw_atlas_core::prelude::*;

const KINDS: [PieceKind; 9] = [
    PieceKind::Interior,
    PieceKind::Top,
    PieceKind::Bottom,
    PieceKind::Left,
    PieceKind::Right,
    PieceKind::LeftTop,
    PieceKind::RightTop,
    PieceKind::LeftBottom,
    PieceKind::RightBottom,
];

fn all_masks(tile: u32) -> MemoryMasks {
    let mut masks = MemoryMasks::new();
    for kind in KINDS {
        for bits in 0..16u8 {
            let tabs = EdgeTabs::new(bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
            masks.insert(
                mask_key(kind, tabs),
                RgbaImage::from_pixel(tile, tile, Rgba([255, 255, 255, 255])),
            );
        }
    }
    masks
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
}

#[test]
fn opaque_mask_cuts_by_luminance() {
    let src = gradient(8, 8);
    let mask = RgbaImage::from_fn(4, 4, |x, _| {
        if x < 2 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    });
    let tile = compose_piece(&src, &mask, (2, 3), 4);
    assert_eq!(tile.dimensions(), (4, 4));
    assert_eq!(*tile.get_pixel(0, 0), Rgba([2, 3, 7, 255]));
    assert_eq!(*tile.get_pixel(1, 3), Rgba([3, 6, 7, 255]));
    assert_eq!(tile.get_pixel(2, 0)[3], 0);
    assert_eq!(tile.get_pixel(3, 3)[3], 0);
}

#[test]
fn transparent_mask_cuts_by_alpha() {
    let src = gradient(4, 4);
    let mut mask = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
    mask.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
    let tile = compose_piece(&src, &mask, (0, 0), 4);
    assert_eq!(tile.get_pixel(0, 0)[3], 255);
    assert_eq!(tile.get_pixel(1, 1)[3], 0);
}

#[test]
fn pixels_outside_the_source_stay_transparent() {
    let src = gradient(4, 4);
    let mask = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let tile = compose_piece(&src, &mask, (2, 2), 4);
    assert_eq!(tile.get_pixel(1, 1)[3], 255);
    assert_eq!(*tile.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    assert_eq!(*tile.get_pixel(3, 0), Rgba([0, 0, 0, 0]));
}

#[test]
fn small_masks_are_scaled_to_the_tile() {
    let src = gradient(16, 16);
    let mask = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let tile = compose_piece(&src, &mask, (0, 0), 16);
    assert_eq!(tile.dimensions(), (16, 16));
    assert!(tile.pixels().all(|p| p[3] > 250));
}

#[test]
fn composite_places_tiles_at_their_frames() {
    let builder = PuzzleBuilder::new(
        PuzzleConfig::builder()
            .piece_size(8)
            .padding(1)
            .atlas_sizes([32u32, 64])
            .seed(Some(2))
            .build(),
    );
    let grid = builder.grid(2, 2).unwrap();
    let puzzle = builder.build(&grid).unwrap();
    let layout = &puzzle.atlases[0];
    assert_eq!(layout.size, 32);
    let tiles: Vec<RgbaImage> = (0..4u8)
        .map(|i| RgbaImage::from_pixel(8, 8, Rgba([i * 60, 0, 0, 255])))
        .collect();
    let canvas = composite_atlas(layout, &tiles, false).unwrap();
    assert_eq!(canvas.dimensions(), (32, 32));
    for (p, tile) in layout.placements.iter().zip(&tiles) {
        assert_eq!(canvas.get_pixel(p.frame.x, p.frame.y), tile.get_pixel(0, 0));
        assert_eq!(
            canvas.get_pixel(p.frame.right(), p.frame.bottom()),
            tile.get_pixel(7, 7)
        );
        // Padding stays empty.
        assert_eq!(canvas.get_pixel(p.frame.x - 1, p.frame.y)[3], 0);
    }

    let outlined = composite_atlas(layout, &tiles, true).unwrap();
    let f = layout.placements[1].frame;
    assert_eq!(*outlined.get_pixel(f.x, f.y), Rgba([255, 0, 0, 255]));

    assert!(matches!(
        composite_atlas(layout, &tiles[..3], false),
        Err(JigsawError::InvalidConfig(_))
    ));
}

#[test]
fn full_image_run_renders_every_atlas() {
    let cfg = PuzzleConfig::builder()
        .piece_size(10)
        .padding(1)
        .mask_ratio(1.4)
        .atlas_sizes([64u32, 128])
        .seed(Some(8))
        .build();
    let image = DynamicImage::ImageRgba8(gradient(65, 42));
    let out = build_puzzle_images(&image, &all_masks(14), &cfg).unwrap();

    assert_eq!((out.source.rows, out.source.columns), (4, 6));
    assert_eq!(out.source.tile_size, 14);
    assert_eq!(out.puzzle.grid.unit_size(), 16);
    // 128 / 16 = 8 -> 64 slots; 64 / 16 = 4 -> 16 slots. 24 pieces fit one 128 atlas.
    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].rgba.dimensions(), (128, 128));
    assert_eq!(out.pages[0].layout.placements.len(), 24);
    assert_eq!(out.stats().num_pieces, 24);

    let seeded = PuzzleBuilder::new(cfg.clone());
    let grid = out.source.grid(cfg.padding).unwrap();
    assert_eq!(seeded.build(&grid).unwrap(), out.puzzle);
}

#[test]
fn missing_mask_reports_the_piece() {
    let cfg = PuzzleConfig::builder()
        .piece_size(10)
        .mask_ratio(1.0)
        .seed(Some(1))
        .build();
    let image = DynamicImage::ImageRgba8(gradient(20, 20));
    match build_puzzle_images(&image, &MemoryMasks::new(), &cfg) {
        Err(JigsawError::MaskUnavailable { row, column, kind, key, .. }) => {
            assert!(row < 2 && column < 2);
            assert!(key.starts_with(&kind));
        }
        Err(other) => panic!("Expected MaskUnavailable error, got {other:?}"),
        Ok(_) => panic!("Expected MaskUnavailable error"),
    }
}

#[test]
fn dir_masks_load_png_by_key() {
    let dir = std::env::temp_dir().join(format!("jigsaw-atlas-masks-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let piece = Piece {
        id: PieceId::new(0, 0),
        tabs: EdgeTabs::new(false, true, true, false),
        kind: PieceKind::LeftTop,
        mask_key: mask_key(PieceKind::LeftTop, EdgeTabs::new(false, true, true, false)),
    };
    assert_eq!(piece.mask_key, "left_top_0_1_1_0");
    let masks = DirMasks::new(&dir);
    masks.check().unwrap();
    RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 255]))
        .save(masks.path_for(&piece.mask_key))
        .unwrap();

    let loaded = masks.mask(&piece).unwrap();
    assert_eq!(loaded.dimensions(), (5, 5));
    // Served from cache after the file is gone.
    std::fs::remove_file(masks.path_for(&piece.mask_key)).unwrap();
    assert_eq!(masks.mask(&piece).unwrap().dimensions(), (5, 5));

    let other = Piece {
        mask_key: "middle_1_1_1_1".into(),
        kind: PieceKind::Interior,
        ..piece.clone()
    };
    assert!(matches!(
        masks.mask(&other),
        Err(JigsawError::MaskUnavailable { .. })
    ));
    let _ = std::fs::remove_dir_all(&dir);

    assert!(DirMasks::new(dir.join("missing")).check().is_err());
}

#[test]
fn every_atlas_page_holds_its_own_pieces() {
    // 4px tiles in 8px atlases: four pieces per page, two pages for a 2x4 grid.
    let cfg = PuzzleConfig::builder()
        .piece_size(4)
        .padding(0)
        .mask_ratio(1.0)
        .atlas_sizes([8u32])
        .seed(Some(5))
        .build();
    let image = DynamicImage::ImageRgba8(gradient(16, 8));
    let out = build_puzzle_images(&image, &all_masks(4), &cfg).unwrap();

    assert_eq!(out.pages.len(), 2);
    let mut seen = Vec::new();
    for page in &out.pages {
        assert_eq!(page.rgba.dimensions(), (8, 8));
        assert_eq!(page.layout.placements.len(), 4);
        for p in &page.layout.placements {
            let expected = Rgba([(p.id.column * 4) as u8, (p.id.row * 4) as u8, 7, 255]);
            assert_eq!(*page.rgba.get_pixel(p.frame.x, p.frame.y), expected);
            assert_eq!(
                *page.rgba.get_pixel(p.frame.right(), p.frame.bottom()),
                Rgba([(p.id.column * 4 + 3) as u8, (p.id.row * 4 + 3) as u8, 7, 255])
            );
            seen.push(p.id);
        }
    }
    let ids: Vec<PieceId> = out.puzzle.pieces.iter().map(|p| p.id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn dir_masks_serve_concurrent_lookups() {
    let dir = std::env::temp_dir().join(format!(
        "jigsaw-atlas-masks-concurrent-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let masks = DirMasks::new(&dir);
    let pieces: Vec<Piece> = (0..4u8)
        .map(|bits| {
            let tabs = EdgeTabs::new(bits & 2 != 0, bits & 1 != 0, true, true);
            let key = mask_key(PieceKind::Interior, tabs);
            let edge = 3 + bits as u32;
            RgbaImage::from_pixel(edge, edge, Rgba([255, 255, 255, 255]))
                .save(masks.path_for(&key))
                .unwrap();
            Piece {
                id: PieceId::new(1, bits as u32),
                tabs,
                kind: PieceKind::Interior,
                mask_key: key,
            }
        })
        .collect();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for (i, piece) in pieces.iter().enumerate() {
                    let edge = 3 + i as u32;
                    assert_eq!(masks.mask(piece).unwrap().dimensions(), (edge, edge));
                }
            });
        }
    });

    // Every key is cached once the threads are done.
    let _ = std::fs::remove_dir_all(&dir);
    for (i, piece) in pieces.iter().enumerate() {
        let edge = 3 + i as u32;
        assert_eq!(masks.mask(piece).unwrap().dimensions(), (edge, edge));
    }
}
