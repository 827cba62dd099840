//! # Core Engine Module
//!
//! Shared configuration used by scene instantiation and applications.

pub mod config;

pub use config::{
    Config, ConfigError, ConfigFormat, EngineConfig, MovementConfig, PlayerConfig, SpatialConfig,
    WalkingConfig,
};
