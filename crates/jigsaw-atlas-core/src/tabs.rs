use rand::Rng;
use tracing::{instrument, trace};

use crate::config::BottomEdge;
use crate::error::Result;
use crate::mask::mask_key;
use crate::model::{EdgeTabs, GridSpec, Piece, PieceId, PieceKind};

/// Classifies a cell by the puzzle borders it touches.
///
/// Rules are applied in order and later ones win: top, bottom, left, right,
/// then the four corners. With [`BottomEdge::Legacy`] the single-edge bottom
/// rule never fires, so only the bottom corners are recognized in the last row.
pub fn classify(grid: &GridSpec, id: PieceId, bottom_edge: BottomEdge) -> PieceKind {
    let top = id.row == 0;
    let bottom = id.row + 1 == grid.rows;
    let left = id.column == 0;
    let right = id.column + 1 == grid.columns;

    let mut kind = PieceKind::Interior;
    if top {
        kind = PieceKind::Top;
    }
    if bottom && bottom_edge == BottomEdge::Flat {
        kind = PieceKind::Bottom;
    }
    if left {
        kind = PieceKind::Left;
    }
    if right {
        kind = PieceKind::Right;
    }
    if top && left {
        kind = PieceKind::LeftTop;
    }
    if top && right {
        kind = PieceKind::RightTop;
    }
    if bottom && left {
        kind = PieceKind::LeftBottom;
    }
    if bottom && right {
        kind = PieceKind::RightBottom;
    }
    kind
}

/// Generates the interlocking tab pattern of a grid.
///
/// Cells are visited row-major. Top and left sides mirror the already
/// generated neighbor (above, previous in row); border sides are flat; the
/// remaining right and bottom sides are fair coin flips, right drawn first.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabAssigner {
    bottom_edge: BottomEdge,
}

impl TabAssigner {
    pub fn new(bottom_edge: BottomEdge) -> Self {
        Self { bottom_edge }
    }

    pub fn bottom_edge(&self) -> BottomEdge {
        self.bottom_edge
    }

    #[instrument(skip_all, fields(rows = grid.rows, columns = grid.columns))]
    pub fn assign<R: Rng + ?Sized>(&self, grid: &GridSpec, rng: &mut R) -> Result<Vec<Piece>> {
        grid.validate()?;
        let mut pieces: Vec<Piece> = Vec::with_capacity(grid.piece_count());
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let id = PieceId::new(row, column);
                let kind = classify(grid, id, self.bottom_edge);

                let top = if row == 0 {
                    false
                } else {
                    !pieces[grid.index_of(PieceId::new(row - 1, column))]
                        .tabs
                        .bottom
                };
                let left = if column == 0 {
                    false
                } else {
                    !pieces[grid.index_of(PieceId::new(row, column - 1))]
                        .tabs
                        .right
                };
                let right = if column + 1 == grid.columns {
                    false
                } else {
                    rng.gen_bool(0.5)
                };
                let bottom = if self.bottom_is_flat(grid, row, kind) {
                    false
                } else {
                    rng.gen_bool(0.5)
                };

                let tabs = EdgeTabs::new(top, right, bottom, left);
                let mask_key = mask_key(kind, tabs);
                trace!(%id, %kind, %mask_key, "assigned piece");
                pieces.push(Piece {
                    id,
                    tabs,
                    kind,
                    mask_key,
                });
            }
        }
        Ok(pieces)
    }

    fn bottom_is_flat(&self, grid: &GridSpec, row: u32, kind: PieceKind) -> bool {
        if row + 1 != grid.rows {
            return false;
        }
        match self.bottom_edge {
            BottomEdge::Flat => true,
            BottomEdge::Legacy => kind.is_corner(),
        }
    }
}

/// Convenience wrapper around [`TabAssigner::assign`].
pub fn assign_tabs<R: Rng + ?Sized>(
    grid: &GridSpec,
    bottom_edge: BottomEdge,
    rng: &mut R,
) -> Result<Vec<Piece>> {
    TabAssigner::new(bottom_edge).assign(grid, rng)
}
