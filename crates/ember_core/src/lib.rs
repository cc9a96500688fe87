//! Ember Core - renderer-agnostic scene descriptions.
//!
//! This crate provides:
//!
//! - **Description types**: `SceneDescription`, `CameraDescription`,
//!   `MaterialDescription`, `ObjectDescription`
//! - **JSON loading**: parsing and validation of scene files
//!
//! # Example
//!
//! ```ignore
//! use ember_core::SceneDescription;
//!
//! let scene = SceneDescription::load("cornell.json")?;
//! println!("Loaded {} objects", scene.objects.len());
//! ```

pub mod error;
pub mod material;
pub mod object;
pub mod scene;

// Re-export commonly used types
pub use error::{SceneError, SceneResult};
pub use material::{CheckerDescription, MaterialDescription, TextureDescription};
pub use object::{ObjectDescription, TransformDescription};
pub use scene::{BackgroundDescription, CameraDescription, SceneDescription};
