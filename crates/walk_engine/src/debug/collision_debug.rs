//! Collision index diagnostics
//!
//! Based on Game Engine Architecture 3rd Edition, Section 10.2:
//! "Debug drawing for collision detection typically includes visualizations
//! of bounding volumes, collision shapes, and query results."
//!
//! There is no renderer here, so the index is summarized as numbers instead:
//! how many colliders of each kind, how full the grid is, and how bad the
//! worst cell gets. A cell size that is far too small shows up as a huge
//! occupied-cell count; far too large as a huge worst bucket.

use std::fmt;

use log::debug;

use crate::physics::{ColliderShape, StaticIndex};

/// Summary of one built static index
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionDebugReport {
    /// Registered colliders
    pub collider_count: usize,
    /// Whole-mesh boxes among them
    pub box_count: usize,
    /// Per-triangle colliders among them
    pub triangle_count: usize,
    /// Grid cell edge
    pub cell_size: f32,
    /// Non-empty cells
    pub occupied_cells: usize,
    /// Colliders kept out of the grid for spanning too many cells
    pub oversized_count: usize,
    /// Largest bucket
    pub max_bucket: usize,
    /// Mean bucket size over occupied cells
    pub mean_bucket: f32,
}

impl CollisionDebugReport {
    /// Gather statistics from an index
    #[allow(clippy::cast_precision_loss)]
    pub fn from_index(index: &StaticIndex) -> Self {
        let grid = index.grid();
        let box_count = index
            .colliders()
            .iter()
            .filter(|c| matches!(c.shape, ColliderShape::Box(_)))
            .count();

        let (entries, max_bucket) = grid
            .buckets()
            .fold((0_usize, 0_usize), |(sum, max), (_, bucket)| (sum + bucket.len(), max.max(bucket.len())));
        let occupied_cells = grid.occupied_cells();
        let mean_bucket = if occupied_cells == 0 {
            0.0
        } else {
            entries as f32 / occupied_cells as f32
        };

        Self {
            collider_count: index.colliders().len(),
            box_count,
            triangle_count: index.colliders().len() - box_count,
            cell_size: grid.cell_size(),
            occupied_cells,
            oversized_count: grid.oversized().len(),
            max_bucket,
            mean_bucket,
        }
    }

    /// Write the report to the log at debug level
    pub fn log(&self) {
        debug!("{}", self);
    }
}

impl fmt::Display for CollisionDebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "static index: {} colliders ({} boxes, {} triangles), cell {} m, {} cells, \
             bucket max {} / mean {:.2}, {} oversized",
            self.collider_count,
            self.box_count,
            self.triangle_count,
            self.cell_size,
            self.occupied_cells,
            self.max_bucket,
            self.mean_bucket,
            self.oversized_count
        )
    }
}
