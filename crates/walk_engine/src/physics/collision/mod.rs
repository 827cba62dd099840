//! Collision geometry
//!
//! This module follows Game Engine Architecture 3rd Edition (GEA 13.3.4):
//! - **Model Space Storage**: Mesh vertices stay in local coordinates
//! - **On-Demand Transformation**: World-space triangles are produced only
//!   when the extractor or tracker asks for them
//!
//! # Module Organization
//!
//! - [`primitives`] - Triangles and the triangle/box overlap test
//! - [`mesh`] - The host mesh boundary ([`CollisionSource`]) and a vertex-buffer adapter

pub mod primitives;
pub mod mesh;

pub use primitives::{Triangle, TriangleCollider};
pub use mesh::{CollisionSource, MeshGeometry, MeshId, TriangleIter};
