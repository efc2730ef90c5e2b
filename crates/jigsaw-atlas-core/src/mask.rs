//! Mask asset naming and lookup.
//!
//! Mask assets are pre-rendered per-shape alpha images named by
//! [`mask_key`]: `{kind}_{top}_{right}_{bottom}_{left}` with tabs as `0`/`1`,
//! e.g. `left_top_0_1_1_0`.

use crate::model::{EdgeTabs, PieceKind};

/// Canonical mask key of a piece shape.
pub fn mask_key(kind: PieceKind, tabs: EdgeTabs) -> String {
    let [t, r, b, l] = tabs.to_array().map(u8::from);
    format!("{}_{}_{}_{}_{}", kind.as_str(), t, r, b, l)
}

#[cfg(feature = "image")]
pub use self::sources::*;

#[cfg(feature = "image")]
mod sources {
    use image::{ImageReader, RgbaImage};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard};
    use tracing::debug;

    use crate::error::{JigsawError, Result};
    use crate::model::Piece;

    /// Resolves a piece to its mask image.
    pub trait MaskSource: Sync {
        fn mask(&self, piece: &Piece) -> Result<RgbaImage>;
    }

    fn unavailable(piece: &Piece, reason: impl ToString) -> JigsawError {
        JigsawError::MaskUnavailable {
            row: piece.id.row,
            column: piece.id.column,
            kind: piece.kind.as_str().to_string(),
            key: piece.mask_key.clone(),
            reason: reason.to_string(),
        }
    }

    /// Masks held in memory, keyed by mask key.
    #[derive(Debug, Default, Clone)]
    pub struct MemoryMasks {
        masks: HashMap<String, RgbaImage>,
    }

    impl MemoryMasks {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: impl Into<String>, mask: RgbaImage) {
            self.masks.insert(key.into(), mask);
        }

        pub fn len(&self) -> usize {
            self.masks.len()
        }

        pub fn is_empty(&self) -> bool {
            self.masks.is_empty()
        }
    }

    impl MaskSource for MemoryMasks {
        fn mask(&self, piece: &Piece) -> Result<RgbaImage> {
            self.masks
                .get(&piece.mask_key)
                .cloned()
                .ok_or_else(|| unavailable(piece, "not registered"))
        }
    }

    /// Masks loaded from `<dir>/<key>.png`, decoded once per key.
    #[derive(Debug)]
    pub struct DirMasks {
        dir: PathBuf,
        cache: Mutex<HashMap<String, RgbaImage>>,
    }

    impl DirMasks {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self {
                dir: dir.into(),
                cache: Mutex::new(HashMap::new()),
            }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// Fails when the mask directory does not exist.
        pub fn check(&self) -> Result<()> {
            if self.dir.is_dir() {
                Ok(())
            } else {
                Err(JigsawError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("mask directory {} not found", self.dir.display()),
                )))
            }
        }

        pub fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.png"))
        }

        fn lock(&self) -> MutexGuard<'_, HashMap<String, RgbaImage>> {
            self.cache.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl MaskSource for DirMasks {
        fn mask(&self, piece: &Piece) -> Result<RgbaImage> {
            if let Some(m) = self.lock().get(&piece.mask_key) {
                return Ok(m.clone());
            }
            // Decoded without the lock held; a racing decode of the same key
            // just inserts an identical image.
            let path = self.path_for(&piece.mask_key);
            let decoded = ImageReader::open(&path)
                .map_err(|e| unavailable(piece, e))?
                .with_guessed_format()
                .map_err(|e| unavailable(piece, e))?
                .decode()
                .map_err(|e| unavailable(piece, e))?
                .to_rgba8();
            debug!(?path, key = %piece.mask_key, "loaded mask");
            self.lock()
                .insert(piece.mask_key.clone(), decoded.clone());
            Ok(decoded)
        }
    }
}
