use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{JigsawError, Result};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x + r.w || r.x >= self.x + self.w || self.y >= r.y + r.h || r.y >= self.y + self.h)
    }
}

/// Puzzle dimensions and per-piece atlas geometry.
///
/// `piece_size` is the edge of one piece tile as drawn into an atlas;
/// `padding` is reserved on every side of a tile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub columns: u32,
    pub piece_size: u32,
    pub padding: u32,
}

impl GridSpec {
    /// Creates a validated grid.
    pub fn new(rows: u32, columns: u32, piece_size: u32, padding: u32) -> Result<Self> {
        let grid = Self {
            rows,
            columns,
            piece_size,
            padding,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(JigsawError::InvalidGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.piece_size == 0 {
            return Err(JigsawError::InvalidConfig(
                "piece_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Slot footprint inside an atlas: `piece_size + 2 * padding`.
    pub fn unit_size(&self) -> u32 {
        self.piece_size
            .saturating_add(self.padding.saturating_mul(2))
    }

    pub fn piece_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Row-major index of a cell.
    pub fn index_of(&self, id: PieceId) -> usize {
        id.row as usize * self.columns as usize + id.column as usize
    }
}

/// Grid coordinates of a piece; unique within one puzzle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    pub row: u32,
    pub column: u32,
}

impl PieceId {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}_y{}", self.column, self.row)
    }
}

/// Tab state of the four sides. `true` protrudes outward, `false` is recessed
/// inward, or flat when the side lies on the puzzle border.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct EdgeTabs {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl EdgeTabs {
    pub fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// `(top, right, bottom, left)` order.
    pub fn to_array(self) -> [bool; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

/// Which puzzle borders a piece touches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    #[serde(rename = "middle")]
    Interior,
    Top,
    Bottom,
    Left,
    Right,
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
}

impl PieceKind {
    /// Name used by the mask asset set.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interior => "middle",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::LeftTop => "left_top",
            Self::RightTop => "right_top",
            Self::LeftBottom => "left_bottom",
            Self::RightBottom => "right_bottom",
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::LeftTop | Self::RightTop | Self::LeftBottom | Self::RightBottom
        )
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grid cell of the puzzle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub tabs: EdgeTabs,
    pub kind: PieceKind,
    /// Canonical mask asset key, see [`crate::mask::mask_key`].
    pub mask_key: String,
}

/// Normalized (0..1) texture coordinates of a piece inside its atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UvRect {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

/// A piece placed within an atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub id: PieceId,
    /// Slot `(column, row)` in the atlas tile grid.
    pub slot: (u32, u32),
    /// Visible tile rectangle in atlas pixels (padding excluded).
    pub frame: Rect,
    pub uv: UvRect,
}

/// Planned atlas: chosen edge length and number of pieces it receives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasPlan {
    pub size: u32,
    pub pieces: usize,
}

/// A laid-out atlas page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasLayout {
    pub index: usize,
    pub size: u32,
    pub unit_size: u32,
    pub piece_size: u32,
    pub padding: u32,
    pub placements: Vec<Placement>,
}

impl AtlasLayout {
    /// Slot rectangle of a placement, padding included.
    pub fn slot_rect(&self, placement: &Placement) -> Rect {
        Rect::new(
            placement.slot.0 * self.unit_size,
            placement.slot.1 * self.unit_size,
            self.unit_size,
            self.unit_size,
        )
    }
}

/// Result of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Puzzle {
    pub grid: GridSpec,
    /// Row-major, `rows * columns` entries.
    pub pieces: Vec<Piece>,
    pub atlases: Vec<AtlasLayout>,
}

/// Statistics about atlas usage for a puzzle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PuzzleStats {
    pub num_atlases: usize,
    pub num_pieces: usize,
    /// Sum of `size * size` over all atlases.
    pub total_atlas_area: u64,
    /// Sum of visible tile areas.
    pub used_tile_area: u64,
    /// used_tile_area / total_atlas_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_atlas_size: u32,
}

impl Puzzle {
    pub fn piece(&self, row: u32, column: u32) -> Option<&Piece> {
        if row >= self.grid.rows || column >= self.grid.columns {
            return None;
        }
        self.pieces
            .get(self.grid.index_of(PieceId::new(row, column)))
    }

    pub fn stats(&self) -> PuzzleStats {
        let mut num_pieces = 0;
        let mut total_atlas_area = 0u64;
        let mut used_tile_area = 0u64;
        let mut max_atlas_size = 0u32;
        for atlas in &self.atlases {
            total_atlas_area += (atlas.size as u64) * (atlas.size as u64);
            max_atlas_size = max_atlas_size.max(atlas.size);
            for p in &atlas.placements {
                num_pieces += 1;
                used_tile_area += (p.frame.w as u64) * (p.frame.h as u64);
            }
        }
        let occupancy = if total_atlas_area > 0 {
            used_tile_area as f64 / total_atlas_area as f64
        } else {
            0.0
        };
        PuzzleStats {
            num_atlases: self.atlases.len(),
            num_pieces,
            total_atlas_area,
            used_tile_area,
            occupancy,
            max_atlas_size,
        }
    }
}

impl PuzzleStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Atlases: {}, Pieces: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_atlases,
            self.num_pieces,
            self.occupancy * 100.0,
            self.total_atlas_area,
            self.used_tile_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_atlas_area.saturating_sub(self.used_tile_area)
    }
}
