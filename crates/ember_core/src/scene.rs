//! Top-level scene description and JSON loading.
//!
//! A description is plain data: it names materials once and lets objects
//! refer to them by key. Building renderable objects from it is the
//! renderer's job.

use std::collections::BTreeMap;
use std::path::Path;

use ember_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::material::{finite, finite_vec, MaterialDescription};
use crate::object::ObjectDescription;

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_vfov() -> f32 {
    40.0
}

/// Thin-lens camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical field of view in degrees
    #[serde(default = "default_vfov")]
    pub vfov_degrees: f32,
    #[serde(default)]
    pub aperture: f32,
    /// Distance to the plane in focus. Defaults to the look-at distance.
    #[serde(default)]
    pub focus_distance: Option<f32>,
}

impl CameraDescription {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self {
            position,
            look_at,
            up: default_up(),
            vfov_degrees: default_vfov(),
            aperture: 0.0,
            focus_distance: None,
        }
    }

    pub fn with_fov(mut self, vfov_degrees: f32) -> Self {
        self.vfov_degrees = vfov_degrees;
        self
    }

    pub fn with_lens(mut self, aperture: f32, focus_distance: f32) -> Self {
        self.aperture = aperture;
        self.focus_distance = Some(focus_distance);
        self
    }

    pub fn direction(&self) -> Vec3 {
        self.look_at - self.position
    }

    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
            .unwrap_or_else(|| self.direction().length())
    }

    fn validate(&self) -> SceneResult<()> {
        finite_vec(&self.position, "camera.position")?;
        finite_vec(&self.look_at, "camera.look_at")?;
        finite_vec(&self.up, "camera.up")?;
        finite(self.aperture, "camera.aperture")?;
        if self.direction().length_squared() == 0.0 {
            return Err(SceneError::invalid(
                "camera.look_at",
                "must differ from camera.position",
            ));
        }
        if self.direction().cross(self.up).length_squared() == 0.0 {
            return Err(SceneError::invalid("camera.up", "must not be parallel to the view direction"));
        }
        if !(self.vfov_degrees > 0.0 && self.vfov_degrees < 180.0) {
            return Err(SceneError::invalid("camera.vfov_degrees", "must be in (0, 180)"));
        }
        if let Some(focus) = self.focus_distance {
            if !(focus.is_finite() && focus > 0.0) {
                return Err(SceneError::invalid("camera.focus_distance", "must be positive"));
            }
        }
        Ok(())
    }
}

/// Vertical gradient seen by rays that escape the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundDescription {
    pub bottom: Color,
    pub top: Color,
}

impl BackgroundDescription {
    pub fn uniform(color: Color) -> Self {
        Self {
            bottom: color,
            top: color,
        }
    }
}

impl Default for BackgroundDescription {
    fn default() -> Self {
        Self {
            bottom: Color::new(1.0, 0.0, 0.0),
            top: Color::new(0.0, 0.0, 1.0),
        }
    }
}

/// A complete scene: camera, background, material table and objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub camera: CameraDescription,
    #[serde(default)]
    pub background: BackgroundDescription,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDescription>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Create an empty scene seen from `camera`.
    pub fn new(camera: CameraDescription) -> Self {
        Self {
            name: None,
            camera,
            background: BackgroundDescription::default(),
            materials: BTreeMap::new(),
            objects: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_background(mut self, background: BackgroundDescription) -> Self {
        self.background = background;
        self
    }

    /// Register a material under `name`, replacing any previous entry.
    pub fn add_material(&mut self, name: impl Into<String>, material: MaterialDescription) {
        self.materials.insert(name.into(), material);
    }

    pub fn add_object(&mut self, object: ObjectDescription) {
        self.objects.push(object);
    }

    /// Load and validate a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scene = Self::from_json_str(&text)?;
        log::info!(
            "Loaded scene {} ({} materials, {} objects)",
            path.display(),
            scene.materials.len(),
            scene.objects.len()
        );
        Ok(scene)
    }

    /// Parse and validate a scene from JSON text.
    pub fn from_json_str(text: &str) -> SceneResult<Self> {
        let scene: SceneDescription = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check material references and numeric ranges.
    pub fn validate(&self) -> SceneResult<()> {
        self.camera.validate()?;
        finite_vec(&self.background.bottom, "background.bottom")?;
        finite_vec(&self.background.top, "background.top")?;

        for (name, material) in &self.materials {
            material.validate(name)?;
        }

        for (index, object) in self.objects.iter().enumerate() {
            object.validate(index)?;
            if let Some(name) = object.material() {
                if !self.materials.contains_key(name) {
                    return Err(SceneError::UnknownMaterial {
                        index,
                        name: name.to_string(),
                    });
                }
            }
        }

        let unused = self
            .materials
            .keys()
            .filter(|name| !self.objects.iter().any(|o| o.material() == Some(name.as_str())))
            .count();
        if unused > 0 {
            log::debug!("{} materials are not referenced by any object", unused);
        }

        Ok(())
    }
}
