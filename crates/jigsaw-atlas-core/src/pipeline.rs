use rand::Rng;
use tracing::{debug, instrument};

use crate::config::PuzzleConfig;
use crate::error::Result;
use crate::layout::layout_atlas;
use crate::model::{GridSpec, Puzzle};
use crate::planner::plan_atlases;
use crate::tabs::TabAssigner;

#[cfg(feature = "image")]
use crate::{
    compositing::{compose_piece, composite_atlas},
    mask::MaskSource,
    model::{AtlasLayout, Piece},
    source::{SourceLayout, prepare_source},
};
#[cfg(feature = "image")]
use image::{DynamicImage, RgbaImage};

#[cfg(all(feature = "image", feature = "parallel"))]
use rayon::prelude::*;

#[instrument(skip_all, fields(rows = grid.rows, columns = grid.columns))]
/// Generates the pieces of `grid` and packs them into atlases.
///
/// Pieces are produced once, row-major, then handed out to the planned
/// atlases as consecutive runs in the same order. Atlas order follows the plan.
pub fn build_puzzle<R: Rng + ?Sized>(
    grid: &GridSpec,
    cfg: &PuzzleConfig,
    rng: &mut R,
) -> Result<Puzzle> {
    cfg.validate()?;
    grid.validate()?;

    let pieces = TabAssigner::new(cfg.bottom_edge).assign(grid, rng)?;
    let unit = grid.unit_size();
    let plan = plan_atlases(pieces.len(), unit, &cfg.atlas_sizes)?;

    let mut atlases = Vec::with_capacity(plan.len());
    let mut rest = pieces.as_slice();
    for (index, p) in plan.iter().enumerate() {
        let (head, tail) = rest.split_at(p.pieces);
        let layout = layout_atlas(index, p.size, grid, head)?;
        debug!(index, size = p.size, pieces = head.len(), "laid out atlas");
        atlases.push(layout);
        rest = tail;
    }

    Ok(Puzzle {
        grid: *grid,
        pieces,
        atlases,
    })
}

/// Fluent entry point holding a configuration.
#[derive(Debug, Clone, Default)]
pub struct PuzzleBuilder {
    cfg: PuzzleConfig,
}

impl PuzzleBuilder {
    pub fn new(cfg: PuzzleConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.cfg
    }

    /// Grid of `rows x columns` pieces of the configured size and padding.
    pub fn grid(&self, rows: u32, columns: u32) -> Result<GridSpec> {
        GridSpec::new(rows, columns, self.cfg.piece_size, self.cfg.padding)
    }

    /// Builds with the configured seed (or entropy).
    pub fn build(&self, grid: &GridSpec) -> Result<Puzzle> {
        let mut rng = self.cfg.rng();
        build_puzzle(grid, &self.cfg, &mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(&self, grid: &GridSpec, rng: &mut R) -> Result<Puzzle> {
        build_puzzle(grid, &self.cfg, rng)
    }
}

/// Output RGBA atlas and its layout.
#[cfg(feature = "image")]
pub struct OutputAtlas {
    pub layout: AtlasLayout,
    pub rgba: RgbaImage,
}

/// Output of an image run: geometry plus rendered atlases.
#[cfg(feature = "image")]
pub struct PuzzleOutput {
    pub source: SourceLayout,
    pub puzzle: Puzzle,
    pub pages: Vec<OutputAtlas>,
}

#[cfg(feature = "image")]
impl PuzzleOutput {
    pub fn stats(&self) -> crate::model::PuzzleStats {
        self.puzzle.stats()
    }
}

#[cfg(feature = "image")]
/// Cuts `image` into pieces and renders the atlases, seeding from `cfg`.
pub fn build_puzzle_images<M: MaskSource + ?Sized>(
    image: &DynamicImage,
    masks: &M,
    cfg: &PuzzleConfig,
) -> Result<PuzzleOutput> {
    let mut rng = cfg.rng();
    build_puzzle_images_with_rng(image, masks, cfg, &mut rng)
}

#[cfg(feature = "image")]
#[instrument(skip_all)]
pub fn build_puzzle_images_with_rng<M: MaskSource + ?Sized, R: Rng + ?Sized>(
    image: &DynamicImage,
    masks: &M,
    cfg: &PuzzleConfig,
    rng: &mut R,
) -> Result<PuzzleOutput> {
    cfg.validate()?;
    let source = SourceLayout::new(image.width(), image.height(), cfg.piece_size, cfg.mask_ratio)?;
    debug!(
        rows = source.rows,
        columns = source.columns,
        tile = source.tile_size,
        border = source.border,
        cropped = source.needs_crop(),
        "source layout"
    );
    let grid = source.grid(cfg.padding)?;
    let puzzle = build_puzzle(&grid, cfg, rng)?;

    let bordered = prepare_source(image, &source);

    // Tiles live only as long as the atlas they are drawn into.
    let mut pages = Vec::with_capacity(puzzle.atlases.len());
    let mut rest = puzzle.pieces.as_slice();
    for layout in &puzzle.atlases {
        let (head, tail) = rest.split_at(layout.placements.len());
        let tiles = compose_tiles(&bordered, &source, head, masks)?;
        let rgba = composite_atlas(layout, &tiles, cfg.outlines)?;
        debug!(index = layout.index, tiles = tiles.len(), "rendered atlas");
        rest = tail;
        pages.push(OutputAtlas {
            layout: layout.clone(),
            rgba,
        });
    }
    Ok(PuzzleOutput {
        source,
        puzzle,
        pages,
    })
}

#[cfg(feature = "image")]
/// Composes one tile per piece, in piece order.
pub fn compose_tiles<M: MaskSource + ?Sized>(
    bordered: &RgbaImage,
    source: &SourceLayout,
    pieces: &[Piece],
    masks: &M,
) -> Result<Vec<RgbaImage>> {
    let one = |piece: &Piece| -> Result<RgbaImage> {
        let mask = masks.mask(piece)?;
        Ok(compose_piece(
            bordered,
            &mask,
            source.tile_origin(piece.id),
            source.tile_size,
        ))
    };
    #[cfg(feature = "parallel")]
    {
        pieces.par_iter().map(one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        pieces.iter().map(one).collect()
    }
}
