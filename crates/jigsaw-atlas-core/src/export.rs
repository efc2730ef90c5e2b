use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JigsawError, Result};
use crate::model::Puzzle;

/// One piece entry: `{ id: [column, row], x: [uMin, uMax], y: [vMin, vMax] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceEntry {
    pub id: [u32; 2],
    pub x: [f64; 2],
    pub y: [f64; 2],
}

/// One atlas entry of the manifest.
///
/// Older manifests stored the tile edge as `unit` and extended `x`/`y` ranges
/// by a full unit. Here `unit` includes padding and the ranges stop at the
/// visible tile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasDescriptor {
    pub size: u32,
    /// Slot footprint: piece size plus padding on both sides.
    pub unit: u32,
    pub padding: u32,
    pub filename: String,
    pub pieces: Vec<PieceEntry>,
}

/// Manifest of a run: serialized as a bare JSON array of atlases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Manifest {
    pub atlases: Vec<AtlasDescriptor>,
}

/// `{basename}_{index}_atlas_{size}x{size}.png`
pub fn atlas_filename(basename: &str, index: usize, size: u32) -> String {
    format!("{basename}_{index}_atlas_{size}x{size}.png")
}

/// `{basename}_atlas.json`
pub fn manifest_filename(basename: &str) -> String {
    format!("{basename}_atlas.json")
}

/// Builds the manifest of `puzzle`; atlas images are named after `basename`.
pub fn to_manifest(puzzle: &Puzzle, basename: &str) -> Manifest {
    let atlases = puzzle
        .atlases
        .iter()
        .map(|a| AtlasDescriptor {
            size: a.size,
            unit: a.unit_size,
            padding: a.padding,
            filename: atlas_filename(basename, a.index, a.size),
            pieces: a
                .placements
                .iter()
                .map(|p| PieceEntry {
                    id: [p.id.column, p.id.row],
                    x: [p.uv.u_min, p.uv.u_max],
                    y: [p.uv.v_min, p.uv.v_max],
                })
                .collect(),
        })
        .collect();
    Manifest { atlases }
}

/// Manifest as a JSON value.
pub fn to_manifest_json(puzzle: &Puzzle, basename: &str) -> Result<Value> {
    serde_json::to_value(to_manifest(puzzle, basename))
        .map_err(|e| JigsawError::Encode(e.to_string()))
}

/// Manifest as compact JSON text.
pub fn to_manifest_string(puzzle: &Puzzle, basename: &str) -> Result<String> {
    serde_json::to_string(&to_manifest(puzzle, basename))
        .map_err(|e| JigsawError::Encode(e.to_string()))
}
