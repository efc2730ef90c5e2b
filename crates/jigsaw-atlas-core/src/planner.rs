//! Splits a piece count across square atlases drawn from a fixed size list.

use tracing::debug;

use crate::error::{JigsawError, Result};
use crate::model::AtlasPlan;

/// Number of `unit_size` slots in a square atlas of edge `size`.
pub fn atlas_capacity(size: u32, unit_size: u32) -> usize {
    if unit_size == 0 {
        return 0;
    }
    let per_row = (size / unit_size) as usize;
    per_row * per_row
}

/// Smallest candidate size holding `count` units, if any.
pub fn smallest_fit(sizes: &[u32], unit_size: u32, count: usize) -> Option<u32> {
    sizes
        .iter()
        .copied()
        .find(|&size| atlas_capacity(size, unit_size) >= count)
}

/// Plans the atlases for `count` pieces.
///
/// While pieces remain, the smallest size that holds all of them closes the
/// plan; otherwise the largest size is filled to capacity and planning
/// continues with the rest. `sizes` must be ascending.
pub fn plan_atlases(count: usize, unit_size: u32, sizes: &[u32]) -> Result<Vec<AtlasPlan>> {
    let mut plans = Vec::new();
    if count == 0 {
        return Ok(plans);
    }
    let Some(&largest) = sizes.last() else {
        return Err(JigsawError::InvalidConfig(
            "atlas_sizes must not be empty".into(),
        ));
    };
    let largest_capacity = atlas_capacity(largest, unit_size);
    if largest_capacity == 0 {
        return Err(JigsawError::ZeroCapacity {
            atlas_size: largest,
            unit_size,
        });
    }

    let mut remaining = count;
    while remaining > 0 {
        let plan = match smallest_fit(sizes, unit_size, remaining) {
            Some(size) => AtlasPlan {
                size,
                pieces: remaining,
            },
            None => AtlasPlan {
                size: largest,
                pieces: largest_capacity,
            },
        };
        debug!(
            index = plans.len(),
            size = plan.size,
            pieces = plan.pieces,
            capacity = atlas_capacity(plan.size, unit_size),
            "planned atlas"
        );
        remaining -= plan.pieces;
        plans.push(plan);
    }
    Ok(plans)
}
