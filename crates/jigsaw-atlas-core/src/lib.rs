//! Core library for cutting an image into jigsaw pieces and packing them into atlases.
//!
//! - Tabs: row-major generation of interlocking tab patterns (`tabs`)
//! - Planning: how many square atlases of which size (`planner`)
//! - Layout: slot grid and normalized UVs per atlas (`layout`)
//! - Pipeline: `build_puzzle` for geometry, `build_puzzle_images` to also render atlases
//! - Data model is serde-serializable; the JSON manifest lives in `export`.
//!
//! Quick example:
//! ```ignore
//! use jigsaw_atlas_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = PuzzleConfig::builder().piece_size(100).padding(2).seed(Some(7)).build();
//! let builder = PuzzleBuilder::new(cfg);
//! let grid = builder.grid(3, 3)?;
//! let puzzle = builder.build(&grid)?;
//! let manifest = to_manifest_json(&puzzle, "photo")?;
//! println!("atlases: {}", puzzle.atlases.len());
//! # Ok(()) }
//! ```

#[cfg(feature = "image")]
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod mask;
pub mod model;
pub mod pipeline;
pub mod planner;
pub mod source;
pub mod tabs;

pub use config::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use mask::*;
pub use model::*;
pub use pipeline::*;
pub use planner::*;
pub use source::*;
pub use tabs::*;

/// Convenience prelude for common types and functions.
/// Importing `jigsaw_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{BottomEdge, PuzzleConfig, PuzzleConfigBuilder};
    pub use crate::export::{AtlasDescriptor, Manifest, PieceEntry, to_manifest, to_manifest_json};
    pub use crate::model::{
        AtlasLayout, AtlasPlan, EdgeTabs, GridSpec, Piece, PieceId, PieceKind, Placement, Puzzle,
        PuzzleStats, Rect, UvRect,
    };
    pub use crate::source::SourceLayout;
    pub use crate::tabs::TabAssigner;
    pub use crate::{PuzzleBuilder, build_puzzle, plan_atlases};
    #[cfg(feature = "image")]
    pub use crate::{
        DirMasks, MaskSource, MemoryMasks, OutputAtlas, PuzzleOutput, build_puzzle_images,
    };
}
