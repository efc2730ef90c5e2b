use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::{JigsawError, Result};
use crate::model::AtlasLayout;

/// Cuts one piece tile out of the bordered source image.
///
/// - `origin`: tile top-left in `bordered`
/// - `mask`: shape mask, resized to `tile_size` when needed. Its alpha channel
///   becomes the tile's alpha; a mask without any transparency is read by
///   luminance instead (white keeps, black cuts).
///
/// Source pixels outside `bordered` stay transparent.
pub fn compose_piece(
    bordered: &RgbaImage,
    mask: &RgbaImage,
    origin: (u32, u32),
    tile_size: u32,
) -> RgbaImage {
    let resized;
    let mask = if mask.dimensions() == (tile_size, tile_size) {
        mask
    } else {
        resized = imageops::resize(mask, tile_size, tile_size, FilterType::Triangle);
        &resized
    };
    let use_luma = mask.pixels().all(|p| p[3] == 255);

    let (bw, bh) = bordered.dimensions();
    let (ox, oy) = origin;
    let mut tile = RgbaImage::new(tile_size, tile_size);
    for yy in 0..tile_size {
        for xx in 0..tile_size {
            let (sx, sy) = (ox + xx, oy + yy);
            if sx >= bw || sy >= bh {
                continue;
            }
            let m = mask.get_pixel(xx, yy);
            let coverage = if use_luma { luma(m) } else { m[3] };
            let mut px = *bordered.get_pixel(sx, sy);
            px[3] = ((px[3] as u16 * coverage as u16) / 255) as u8;
            tile.put_pixel(xx, yy, px);
        }
    }
    tile
}

/// Draws the tiles of one atlas onto a transparent `size x size` canvas.
///
/// `tiles[i]` belongs to `layout.placements[i]`. With `outlines` a red 1px
/// frame is drawn around every tile (debug).
pub fn composite_atlas(layout: &AtlasLayout, tiles: &[RgbaImage], outlines: bool) -> Result<RgbaImage> {
    if tiles.len() != layout.placements.len() {
        return Err(JigsawError::InvalidConfig(format!(
            "atlas {} has {} placements but {} tiles",
            layout.index,
            layout.placements.len(),
            tiles.len()
        )));
    }
    let mut canvas = RgbaImage::new(layout.size, layout.size);
    for (placement, tile) in layout.placements.iter().zip(tiles) {
        let f = placement.frame;
        imageops::replace(&mut canvas, tile, f.x as i64, f.y as i64);
        if outlines {
            draw_outline(&mut canvas, f.x, f.y, f.w, f.h);
        }
    }
    Ok(canvas)
}

/// Rec. 709 luma in integer arithmetic; white maps to 255 exactly.
fn luma(p: &Rgba<u8>) -> u8 {
    ((2126 * p[0] as u32 + 7152 * p[1] as u32 + 722 * p[2] as u32) / 10000) as u8
}

fn draw_outline(canvas: &mut RgbaImage, dx: u32, dy: u32, w: u32, h: u32) {
    let (cw, ch) = canvas.dimensions();
    let red = Rgba([255, 0, 0, 255]);
    for xx in 0..w {
        if dx + xx < cw && dy < ch {
            canvas.put_pixel(dx + xx, dy, red);
        }
        let by = dy + h.saturating_sub(1);
        if dx + xx < cw && by < ch {
            canvas.put_pixel(dx + xx, by, red);
        }
    }
    for yy in 0..h {
        if dx < cw && dy + yy < ch {
            canvas.put_pixel(dx, dy + yy, red);
        }
        let rx = dx + w.saturating_sub(1);
        if rx < cw && dy + yy < ch {
            canvas.put_pixel(rx, dy + yy, red);
        }
    }
}
