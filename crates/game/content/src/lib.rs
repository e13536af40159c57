//! Data-driven content definitions and loaders.
//!
//! This crate ships the default skill catalog, pathway tables and game
//! configuration, and provides loaders for RON/TOML data files:
//! - Skill definitions (RON) into a [`beyonder_core::SkillRegistry`]
//! - Pathway progression tables (RON) into a [`beyonder_core::PathwayRegistry`]
//! - Game configuration (TOML) into a [`beyonder_core::GameConfig`]
//!
//! Content is consumed by runtime oracles and never appears in actor state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{Content, ConfigLoader, ContentFactory, LoadResult, PathwayLoader, SkillLoader};
