use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default atlas edge candidates, ascending.
pub const DEFAULT_ATLAS_SIZES: [u32; 3] = [1024, 2048, 4096];
/// Mask canvas edge over the image area it covers (200px masks around 139px cells).
pub const DEFAULT_MASK_RATIO: f32 = 200.0 / 139.0;
pub const DEFAULT_PIECE_SIZE: u32 = 100;
pub const DEFAULT_PADDING: u32 = 2;

/// How pieces in the last row are treated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BottomEdge {
    /// Last-row pieces classify as bottom pieces and get a flat bottom side.
    #[default]
    Flat,
    /// Reproduces the historical generator: non-corner last-row pieces never
    /// classify as bottom and draw a random bottom tab.
    Legacy,
}

impl FromStr for BottomEdge {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "legacy" => Ok(Self::Legacy),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PuzzleConfig {
    /// Source cell edge in pixels.
    #[serde(default = "default_piece_size")]
    pub piece_size: u32,
    /// Pixels reserved on every side of a tile inside an atlas.
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Candidate atlas edges, strictly ascending.
    #[serde(default = "default_atlas_sizes")]
    pub atlas_sizes: Vec<u32>,
    /// Tile edge over cell edge; tiles are larger than cells to fit the tabs.
    #[serde(default = "default_mask_ratio")]
    pub mask_ratio: f32,
    #[serde(default)]
    pub bottom_edge: BottomEdge,
    /// Seed for tab generation. None draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Draw red outlines around tiles on rendered atlases (debug).
    #[serde(default)]
    pub outlines: bool,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            piece_size: default_piece_size(),
            padding: default_padding(),
            atlas_sizes: default_atlas_sizes(),
            mask_ratio: default_mask_ratio(),
            bottom_edge: BottomEdge::default(),
            seed: None,
            outlines: false,
        }
    }
}

impl PuzzleConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `piece_size` is zero
    /// - the atlas size list is empty, contains zero or is not strictly ascending
    /// - `mask_ratio` is not a finite number >= 1.0
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::JigsawError;

        if self.piece_size == 0 {
            return Err(JigsawError::InvalidConfig(
                "piece_size must be greater than 0".into(),
            ));
        }
        if self.atlas_sizes.is_empty() {
            return Err(JigsawError::InvalidConfig(
                "atlas_sizes must not be empty".into(),
            ));
        }
        if self.atlas_sizes.contains(&0) {
            return Err(JigsawError::InvalidConfig(
                "atlas_sizes must not contain 0".into(),
            ));
        }
        if self.atlas_sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(JigsawError::InvalidConfig(format!(
                "atlas_sizes must be strictly ascending: {:?}",
                self.atlas_sizes
            )));
        }
        if !self.mask_ratio.is_finite() || self.mask_ratio < 1.0 {
            return Err(JigsawError::InvalidConfig(format!(
                "mask_ratio must be >= 1.0, got {}",
                self.mask_ratio
            )));
        }
        Ok(())
    }

    /// Random source for tab generation.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Create a fluent builder for `PuzzleConfig`.
    pub fn builder() -> PuzzleConfigBuilder {
        PuzzleConfigBuilder::new()
    }
}

fn default_piece_size() -> u32 {
    DEFAULT_PIECE_SIZE
}
fn default_padding() -> u32 {
    DEFAULT_PADDING
}
fn default_atlas_sizes() -> Vec<u32> {
    DEFAULT_ATLAS_SIZES.to_vec()
}
fn default_mask_ratio() -> f32 {
    DEFAULT_MASK_RATIO
}

/// Builder for `PuzzleConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PuzzleConfigBuilder {
    cfg: PuzzleConfig,
}

impl PuzzleConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PuzzleConfig::default(),
        }
    }
    pub fn piece_size(mut self, v: u32) -> Self {
        self.cfg.piece_size = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn atlas_sizes(mut self, v: impl Into<Vec<u32>>) -> Self {
        self.cfg.atlas_sizes = v.into();
        self
    }
    pub fn mask_ratio(mut self, v: f32) -> Self {
        self.cfg.mask_ratio = v;
        self
    }
    pub fn bottom_edge(mut self, v: BottomEdge) -> Self {
        self.cfg.bottom_edge = v;
        self
    }
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.cfg.seed = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn build(self) -> PuzzleConfig {
        self.cfg
    }
}
