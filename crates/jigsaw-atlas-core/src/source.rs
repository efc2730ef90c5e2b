use serde::{Deserialize, Serialize};

use crate::error::{JigsawError, Result};
use crate::model::{GridSpec, PieceId, Rect};

/// Tile edge for a cell: `round(cell_size * mask_ratio)`, never below the cell.
pub fn tile_edge(cell_size: u32, mask_ratio: f32) -> u32 {
    let tile = ((cell_size as f32 * mask_ratio) + 0.5) as u32;
    tile.max(cell_size)
}

/// Geometry of a source image cut into cells.
///
/// The image is center-cropped to a whole number of cells, then surrounded by
/// a transparent border so every tile (cell plus tab overhang) can be read
/// without leaving the image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLayout {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    pub rows: u32,
    pub columns: u32,
    /// Region of the original image that is kept.
    pub crop: Rect,
    /// Tile edge, `round(cell_size * mask_ratio)`.
    pub tile_size: u32,
    /// Transparent border added around the cropped image.
    pub border: u32,
}

impl SourceLayout {
    pub fn new(width: u32, height: u32, cell_size: u32, mask_ratio: f32) -> Result<Self> {
        if cell_size == 0 {
            return Err(JigsawError::InvalidConfig(
                "piece_size must be greater than 0".into(),
            ));
        }
        let columns = width / cell_size;
        let rows = height / cell_size;
        if rows == 0 || columns == 0 {
            return Err(JigsawError::ImageTooSmall {
                width,
                height,
                piece_size: cell_size,
            });
        }
        let crop_w = columns * cell_size;
        let crop_h = rows * cell_size;
        let crop = Rect::new((width - crop_w) / 2, (height - crop_h) / 2, crop_w, crop_h);
        let tile_size = tile_edge(cell_size, mask_ratio);
        let border = (tile_size - cell_size) / 2;
        Ok(Self {
            width,
            height,
            cell_size,
            rows,
            columns,
            crop,
            tile_size,
            border,
        })
    }

    /// True when the image is not a whole number of cells.
    pub fn needs_crop(&self) -> bool {
        self.crop.w != self.width || self.crop.h != self.height
    }

    /// Size of the bordered image.
    pub fn bordered_size(&self) -> (u32, u32) {
        (
            self.crop.w + self.border * 2,
            self.crop.h + self.border * 2,
        )
    }

    /// Top-left of a piece's tile inside the bordered image.
    pub fn tile_origin(&self, id: PieceId) -> (u32, u32) {
        (id.column * self.cell_size, id.row * self.cell_size)
    }

    /// Grid whose pieces are the tiles of this layout.
    pub fn grid(&self, padding: u32) -> Result<GridSpec> {
        GridSpec::new(self.rows, self.columns, self.tile_size, padding)
    }
}

/// Crops and borders `image` according to `layout`.
#[cfg(feature = "image")]
pub fn prepare_source(image: &image::DynamicImage, layout: &SourceLayout) -> image::RgbaImage {
    use image::{RgbaImage, imageops};

    let rgba = image.to_rgba8();
    let cropped = if layout.needs_crop() {
        imageops::crop_imm(
            &rgba,
            layout.crop.x,
            layout.crop.y,
            layout.crop.w,
            layout.crop.h,
        )
        .to_image()
    } else {
        rgba
    };
    if layout.border == 0 {
        return cropped;
    }
    let (w, h) = layout.bordered_size();
    let mut bordered = RgbaImage::new(w, h);
    imageops::replace(
        &mut bordered,
        &cropped,
        layout.border as i64,
        layout.border as i64,
    );
    bordered
}
