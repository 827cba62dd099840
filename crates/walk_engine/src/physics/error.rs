//! Collision setup errors
//!
//! None of these escape the per-frame path: frame-time callers log and skip.
//! They surface only from setup calls (index build, scene instantiation) and
//! from the fallible halves of the mesh boundary.

use super::collision::MeshId;

/// Errors raised while building collision data
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Mesh has no position attribute to extract triangles from
    #[error("mesh {0} has no position attribute")]
    MissingPositions(MeshId),

    /// Index buffer references a vertex that does not exist
    #[error("mesh {mesh}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending mesh
        mesh: MeshId,
        /// Index value found in the buffer
        index: u32,
        /// Number of vertices available
        vertex_count: usize,
    },

    /// World matrix contains NaN or infinity
    #[error("mesh {0} has a non-finite world matrix")]
    NonFiniteTransform(MeshId),

    /// Spatial hash cell size must be finite and positive
    #[error("invalid spatial hash cell size: {0}")]
    InvalidCellSize(f32),

    /// Configuration value out of range
    #[error("invalid walking config: {0}")]
    InvalidConfig(String),
}
