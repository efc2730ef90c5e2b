use image::{Rgba, RgbaImage};
use jigsaw_atlas_core::mask::mask_key;
use jigsaw_atlas_core::model::{EdgeTabs, PieceKind};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

const MASK_SIZE: u32 = 200;
const BODY: u32 = 139;
const KNOB_RADIUS: f32 = 18.0;

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

fn ensure_dir(p: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(p)?;
    Ok(())
}

fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, c: [u8; 4]) {
    let (iw, ih) = img.dimensions();
    for yy in y.min(ih)..(y.saturating_add(h)).min(ih) {
        for xx in x.min(iw)..(x.saturating_add(w)).min(iw) {
            img.put_pixel(xx, yy, Rgba(c));
        }
    }
}

fn draw_circle(img: &mut RgbaImage, cx: f32, cy: f32, r: f32, c: [u8; 4]) {
    let (iw, ih) = img.dimensions();
    for y in 0..ih {
        for x in 0..iw {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x, y, Rgba(c));
            }
        }
    }
}

/// Sides of `kind` that lie on the puzzle border, `(top, right, bottom, left)`.
fn flat_sides(kind: PieceKind) -> [bool; 4] {
    use PieceKind::*;
    [
        matches!(kind, Top | LeftTop | RightTop),
        matches!(kind, Right | RightTop | RightBottom),
        matches!(kind, Bottom | LeftBottom | RightBottom),
        matches!(kind, Left | LeftTop | LeftBottom),
    ]
}

fn draw_mask(kind: PieceKind, tabs: EdgeTabs) -> RgbaImage {
    let white = [255, 255, 255, 255];
    let clear = [0, 0, 0, 0];
    let inset = (MASK_SIZE - BODY) / 2;
    let mut img = RgbaImage::new(MASK_SIZE, MASK_SIZE);
    draw_rect(&mut img, inset, inset, BODY, BODY, white);

    let mid = MASK_SIZE as f32 / 2.0;
    let lo = inset as f32;
    let hi = (inset + BODY) as f32;
    let shift = KNOB_RADIUS * 0.8;
    // (edge center, outward direction) per side in top, right, bottom, left order
    let sides = [
        ((mid, lo), (0.0, -1.0)),
        ((hi, mid), (1.0, 0.0)),
        ((mid, hi), (0.0, 1.0)),
        ((lo, mid), (-1.0, 0.0)),
    ];
    let flat = flat_sides(kind);
    for (i, (((ex, ey), (dx, dy)), out)) in sides.into_iter().zip(tabs.to_array()).enumerate() {
        if flat[i] {
            continue;
        }
        if out {
            draw_circle(&mut img, ex + dx * shift, ey + dy * shift, KNOB_RADIUS, white);
        } else {
            draw_circle(&mut img, ex - dx * shift, ey - dy * shift, KNOB_RADIUS, clear);
        }
    }
    img
}

fn gen_masks(out: &Path) -> anyhow::Result<usize> {
    ensure_dir(out)?;
    let mut n = 0;
    for kind in KINDS {
        for bits in 0..16u8 {
            let tabs = EdgeTabs::new(bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
            let img = draw_mask(kind, tabs);
            img.save(out.join(format!("{}.png", mask_key(kind, tabs))))?;
            n += 1;
        }
    }
    Ok(n)
}

fn gen_photo(path: &Path) -> anyhow::Result<()> {
    // Noisy gradient, not a whole number of pieces, to exercise cropping.
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xDEADBEEF);
    let (w, h) = (1037u32, 713u32);
    let img = RgbaImage::from_fn(w, h, |x, y| {
        let n: u8 = rng.gen_range(0..24);
        Rgba([
            ((x * 255) / w) as u8 ^ n,
            ((y * 255) / h) as u8 ^ n,
            (((x + y) * 127) / (w + h)) as u8,
            255,
        ])
    });
    img.save(path)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Usage: cargo run -p jigsaw-atlas-cli --example gen_masks -- [out_root]
    // Default out_root: assets/generated
    let out_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/generated"));
    ensure_dir(&out_root)?;

    let n = gen_masks(&out_root.join("mask"))?;
    gen_photo(&out_root.join("photo.png"))?;

    println!(
        "Generated {} masks and photo.png under {}",
        n,
        out_root.display()
    );
    println!(
        "Try: cd {} && jigsaw-atlas build -f photo.png",
        out_root.display()
    );
    Ok(())
}
