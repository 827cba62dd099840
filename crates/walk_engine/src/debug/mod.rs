//! Debug module for diagnostics
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 10.2:
//! "Debug Drawing Facilities"

pub mod collision_debug;

pub use collision_debug::CollisionDebugReport;
