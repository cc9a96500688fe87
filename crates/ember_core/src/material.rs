//! Material and texture descriptions.

use ember_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// A color source: either a constant `[r, g, b]` or a procedural checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextureDescription {
    Constant(Color),
    Checker { checker: CheckerDescription },
}

impl From<Color> for TextureDescription {
    fn from(color: Color) -> Self {
        TextureDescription::Constant(color)
    }
}

/// 3D checker alternating between `even` and `odd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerDescription {
    pub even: Color,
    pub odd: Color,
    #[serde(default = "unit_frequency")]
    pub frequency: Vec3,
}

fn unit_frequency() -> Vec3 {
    Vec3::ONE
}

fn white() -> Color {
    Color::ONE
}

fn glass_ior() -> f32 {
    1.5
}

/// Config for materials, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    Lambertian {
        albedo: TextureDescription,
    },
    Metal {
        albedo: Color,
        #[serde(default)]
        roughness: f32,
    },
    Dielectric {
        #[serde(default = "white")]
        albedo: Color,
        #[serde(default = "glass_ior")]
        refractive_index: f32,
    },
    DiffuseLight {
        emit: TextureDescription,
    },
}

impl MaterialDescription {
    pub(crate) fn validate(&self, name: &str) -> SceneResult<()> {
        let field = |f: &str| format!("materials.{name}.{f}");
        match self {
            MaterialDescription::Lambertian { albedo } => albedo.validate(&field("albedo")),
            MaterialDescription::Metal { albedo, roughness } => {
                finite_vec(albedo, &field("albedo"))?;
                finite(*roughness, &field("roughness"))
            }
            MaterialDescription::Dielectric {
                albedo,
                refractive_index,
            } => {
                finite_vec(albedo, &field("albedo"))?;
                if !(refractive_index.is_finite() && *refractive_index > 0.0) {
                    return Err(SceneError::invalid(
                        field("refractive_index"),
                        "must be a positive number",
                    ));
                }
                Ok(())
            }
            MaterialDescription::DiffuseLight { emit } => emit.validate(&field("emit")),
        }
    }
}

impl TextureDescription {
    fn validate(&self, field: &str) -> SceneResult<()> {
        match self {
            TextureDescription::Constant(c) => finite_vec(c, field),
            TextureDescription::Checker { checker } => {
                finite_vec(&checker.even, field)?;
                finite_vec(&checker.odd, field)?;
                finite_vec(&checker.frequency, field)
            }
        }
    }
}

pub(crate) fn finite(value: f32, field: &str) -> SceneResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::invalid(field, "must be finite"))
    }
}

pub(crate) fn finite_vec(value: &Vec3, field: &str) -> SceneResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::invalid(field, "components must be finite"))
    }
}
