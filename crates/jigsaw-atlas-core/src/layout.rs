use crate::error::{JigsawError, Result};
use crate::model::{AtlasLayout, GridSpec, Piece, Placement, Rect, UvRect};
use crate::planner::atlas_capacity;

/// Number of slot columns (and rows) in a square atlas.
pub fn slots_per_row(size: u32, unit_size: u32) -> u32 {
    if unit_size == 0 { 0 } else { size / unit_size }
}

/// Places `pieces` row-major into the slot grid of a `size` atlas.
///
/// Input order is kept: piece `i` lands in slot `(i % per_row, i / per_row)`.
/// The frame is the visible tile, inset by `padding` inside its slot; UVs are
/// the frame divided by `size`.
pub fn layout_atlas(
    index: usize,
    size: u32,
    grid: &GridSpec,
    pieces: &[Piece],
) -> Result<AtlasLayout> {
    let unit = grid.unit_size();
    let capacity = atlas_capacity(size, unit);
    if pieces.len() > capacity {
        return Err(JigsawError::OverCapacity {
            atlas_index: index,
            size,
            requested: pieces.len(),
            capacity,
        });
    }
    let per_row = slots_per_row(size, unit) as usize;
    let extent = size as f64;

    let placements = pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let col = (i % per_row) as u32;
            let row = (i / per_row) as u32;
            let x = col * unit + grid.padding;
            let y = row * unit + grid.padding;
            let frame = Rect::new(x, y, grid.piece_size, grid.piece_size);
            let uv = UvRect {
                u_min: x as f64 / extent,
                u_max: (x + grid.piece_size) as f64 / extent,
                v_min: y as f64 / extent,
                v_max: (y + grid.piece_size) as f64 / extent,
            };
            Placement {
                id: piece.id,
                slot: (col, row),
                frame,
                uv,
            }
        })
        .collect();

    Ok(AtlasLayout {
        index,
        size,
        unit_size: unit,
        piece_size: grid.piece_size,
        padding: grid.padding,
        placements,
    })
}
