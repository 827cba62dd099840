//! Uniform-grid spatial hash for static colliders
//!
//! Every static collider is bucketed into every grid cell its AABB overlaps.
//! A lookup only visits the handful of cells around the query volume, so the
//! per-frame cost is independent of scene size.
//!
//! The grid is built once per loaded scene; there is no incremental
//! reinsertion. Scenes that stream geometry later rebuild the whole grid.

use rustc_hash::FxHashMap;

use log::{debug, warn};

use crate::foundation::math::Vec3;
use crate::physics::error::CollisionError;
use super::aabb::AABB;
use super::spatial_query::SpatialQuery;

/// Integer cell coordinates `(ix, iy, iz)`
pub type CellKey = (i32, i32, i32);

/// Colliders covering more cells than this are kept in an overflow list that
/// every query returns, instead of being copied into thousands of buckets.
pub const DEFAULT_MAX_CELLS_PER_COLLIDER: usize = 65_536;

/// Stable handle to a static collider (index into the frozen collider list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u32);

impl ColliderHandle {
    /// Index into the collider list this handle was issued for
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inclusive range of cells covered by a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: CellKey,
    max: CellKey,
}

impl CellRange {
    fn cell_count(&self) -> usize {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as u64;
        let count = span(self.min.0, self.max.0)
            .saturating_mul(span(self.min.1, self.max.1))
            .saturating_mul(span(self.min.2, self.max.2));
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    fn contains(&self, key: &CellKey) -> bool {
        (self.min.0..=self.max.0).contains(&key.0)
            && (self.min.1..=self.max.1).contains(&key.1)
            && (self.min.2..=self.max.2).contains(&key.2)
    }

    fn for_each(&self, mut f: impl FnMut(CellKey)) {
        for ix in self.min.0..=self.max.0 {
            for iy in self.min.1..=self.max.1 {
                for iz in self.min.2..=self.max.2 {
                    f((ix, iy, iz));
                }
            }
        }
    }
}

/// Uniform grid mapping cell keys to collider handles
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    inv_cell_size: f32,
    max_cells_per_collider: usize,
    cells: FxHashMap<CellKey, Vec<ColliderHandle>>,
    oversized: Vec<ColliderHandle>,
    collider_count: usize,
}

impl SpatialHashGrid {
    /// Create an empty grid
    pub fn new(cell_size: f32) -> Result<Self, CollisionError> {
        Self::with_cell_limit(cell_size, DEFAULT_MAX_CELLS_PER_COLLIDER)
    }

    /// Create an empty grid with a custom per-collider cell budget
    pub fn with_cell_limit(cell_size: f32, max_cells_per_collider: usize) -> Result<Self, CollisionError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CollisionError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            max_cells_per_collider: max_cells_per_collider.max(1),
            cells: FxHashMap::default(),
            oversized: Vec::new(),
            collider_count: 0,
        })
    }

    /// Build a grid from `(handle, box)` pairs in one pass
    pub fn build<I>(cell_size: f32, colliders: I) -> Result<Self, CollisionError>
    where
        I: IntoIterator<Item = (ColliderHandle, AABB)>,
    {
        let mut grid = Self::new(cell_size)?;
        for (handle, aabb) in colliders {
            grid.insert(handle, &aabb);
        }
        debug!(
            "Spatial hash built: {} colliders, {} cells, {} oversized (cell size {})",
            grid.collider_count,
            grid.cells.len(),
            grid.oversized.len(),
            grid.cell_size
        );
        Ok(grid)
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of colliders inserted
    pub fn collider_count(&self) -> usize {
        self.collider_count
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Colliders stored outside the grid because they span too many cells
    pub fn oversized(&self) -> &[ColliderHandle] {
        &self.oversized
    }

    /// Iterate occupied buckets
    pub fn buckets(&self) -> impl Iterator<Item = (&CellKey, &[ColliderHandle])> {
        self.cells.iter().map(|(key, bucket)| (key, bucket.as_slice()))
    }

    /// Integer cell coordinate for a world coordinate
    #[allow(clippy::cast_possible_truncation)]
    fn coord(&self, value: f32) -> i32 {
        // `as` saturates, so far-away coordinates land in the edge cells
        (value * self.inv_cell_size).floor() as i32
    }

    /// Cell containing a point
    pub fn cell_of(&self, point: Vec3) -> CellKey {
        (self.coord(point.x), self.coord(point.y), self.coord(point.z))
    }

    fn range_for(&self, aabb: &AABB) -> CellRange {
        CellRange {
            min: self.cell_of(aabb.min),
            max: self.cell_of(aabb.max),
        }
    }

    /// Insert a collider reference into every cell its box overlaps
    fn insert(&mut self, handle: ColliderHandle, aabb: &AABB) {
        if !aabb.is_finite() {
            warn!("Skipping collider {:?} with non-finite bounds", handle);
            return;
        }
        self.collider_count += 1;

        let range = self.range_for(aabb);
        if range.cell_count() > self.max_cells_per_collider {
            self.oversized.push(handle);
            return;
        }
        range.for_each(|key| self.cells.entry(key).or_default().push(handle));
    }

    /// Cell keys intersected by the cube bounding the sphere `(point, radius)`
    pub fn cells_for(&self, point: Vec3, radius: f32) -> Vec<CellKey> {
        let r = radius.abs();
        let range = self.range_for(&AABB::from_center_extents(point, Vec3::new(r, r, r)));
        let mut keys = Vec::with_capacity(range.cell_count().min(self.max_cells_per_collider));
        if range.cell_count() <= self.max_cells_per_collider {
            range.for_each(|key| keys.push(key));
        } else {
            keys.extend(self.cells.keys().filter(|key| range.contains(key)).copied());
        }
        keys
    }

    /// Union of the buckets covering `aabb`, deduplicated by handle
    pub fn candidates_in_box_into(&self, aabb: &AABB, out: &mut Vec<ColliderHandle>) {
        out.clear();
        out.extend_from_slice(&self.oversized);

        let range = self.range_for(aabb);
        if range.cell_count() <= self.max_cells_per_collider {
            range.for_each(|key| {
                if let Some(bucket) = self.cells.get(&key) {
                    out.extend_from_slice(bucket);
                }
            });
        } else {
            // Query larger than the grid budget: walk occupied cells instead
            for (key, bucket) in &self.cells {
                if range.contains(key) {
                    out.extend_from_slice(bucket);
                }
            }
        }

        out.sort_unstable();
        out.dedup();
    }

    /// Candidate colliders near `point`: every collider whose box touches the
    /// sphere is returned; extra candidates are possible
    pub fn candidates_near(&self, point: Vec3, radius: f32) -> Vec<ColliderHandle> {
        let r = radius.abs();
        let mut out = Vec::new();
        self.candidates_in_box_into(&AABB::from_center_extents(point, Vec3::new(r, r, r)), &mut out);
        out
    }
}

impl SpatialQuery for SpatialHashGrid {
    fn candidates_in_box_into(&self, aabb: &AABB, out: &mut Vec<ColliderHandle>) {
        SpatialHashGrid::candidates_in_box_into(self, aabb, out);
    }

    fn collider_count(&self) -> usize {
        self.collider_count
    }
}

/// Build the static grid from a collider list (handles are list indices)
pub fn spatial_hash_static_boxes<'a, I>(colliders: I, cell_size: f32) -> Result<SpatialHashGrid, CollisionError>
where
    I: IntoIterator<Item = &'a AABB>,
{
    SpatialHashGrid::build(
        cell_size,
        colliders
            .into_iter()
            .enumerate()
            .filter_map(|(index, aabb)| u32::try_from(index).ok().map(|i| (ColliderHandle(i), *aabb))),
    )
}
