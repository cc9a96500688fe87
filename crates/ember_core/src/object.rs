//! Geometric object descriptions.

use ember_math::{axis_angle, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::material::{finite, finite_vec};

fn unit_scale() -> f32 {
    1.0
}

/// Placement of a box or rect: rotation about `axis`, then translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDescription {
    #[serde(default)]
    pub axis: Vec3,
    #[serde(default)]
    pub angle_degrees: f32,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            axis: Vec3::ZERO,
            angle_degrees: 0.0,
            translation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl TransformDescription {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, axis: Vec3, angle_degrees: f32) -> Self {
        self.axis = axis;
        self.angle_degrees = angle_degrees;
        self
    }

    pub fn to_transform(&self) -> Transform {
        Transform::new(
            axis_angle(self.axis, self.angle_degrees.to_radians()),
            self.translation,
            self.scale,
        )
    }

    fn validate(&self, field: &str) -> SceneResult<()> {
        finite_vec(&self.axis, field)?;
        finite(self.angle_degrees, field)?;
        finite_vec(&self.translation, field)?;
        finite(self.scale, field)
    }
}

/// Config for scene objects, tagged by `type`.
///
/// `material` names an entry of the scene's material table. Objects
/// without one render black and stop paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Sphere {
        center: Vec3,
        /// Negative radius turns the sphere inside out.
        radius: f32,
        #[serde(default)]
        material: Option<String>,
    },
    Box {
        #[serde(default)]
        transform: TransformDescription,
        /// Full edge lengths.
        extents: Vec3,
        #[serde(default)]
        material: Option<String>,
    },
    Rect {
        #[serde(default)]
        transform: TransformDescription,
        width: f32,
        height: f32,
        #[serde(default)]
        material: Option<String>,
    },
}

impl ObjectDescription {
    pub fn material(&self) -> Option<&str> {
        match self {
            ObjectDescription::Sphere { material, .. }
            | ObjectDescription::Box { material, .. }
            | ObjectDescription::Rect { material, .. } => material.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ObjectDescription::Sphere { .. } => "sphere",
            ObjectDescription::Box { .. } => "box",
            ObjectDescription::Rect { .. } => "rect",
        }
    }

    pub(crate) fn validate(&self, index: usize) -> SceneResult<()> {
        let field = |f: &str| format!("objects[{index}].{f}");
        match self {
            ObjectDescription::Sphere { center, radius, .. } => {
                finite_vec(center, &field("center"))?;
                if !radius.is_finite() || *radius == 0.0 {
                    return Err(SceneError::invalid(field("radius"), "must be finite and non-zero"));
                }
                Ok(())
            }
            ObjectDescription::Box {
                transform, extents, ..
            } => {
                transform.validate(&field("transform"))?;
                if !(extents.is_finite() && extents.min_element() > 0.0) {
                    return Err(SceneError::invalid(field("extents"), "must be positive"));
                }
                Ok(())
            }
            ObjectDescription::Rect {
                transform,
                width,
                height,
                ..
            } => {
                transform.validate(&field("transform"))?;
                for (name, value) in [("width", width), ("height", height)] {
                    if !(value.is_finite() && *value > 0.0) {
                        return Err(SceneError::invalid(field(name), "must be positive"));
                    }
                }
                Ok(())
            }
        }
    }
}
