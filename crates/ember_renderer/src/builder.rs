//! Conversion from `ember_core` descriptions to renderable objects.

use std::collections::HashMap;
use std::sync::Arc;

use ember_core::{
    BackgroundDescription, CameraDescription, MaterialDescription, ObjectDescription,
    SceneDescription, SceneResult, TextureDescription,
};

use crate::background::Background;
use crate::camera::Camera;
use crate::cuboid::Cuboid;
use crate::material::{Dielectric, DiffuseLight, Lambertian, Material, Metal};
use crate::rect::Rect;
use crate::scene::Scene;
use crate::sphere::Sphere;
use crate::texture::{CheckerTexture, ConstantTexture, Texture};
use crate::viewport::Viewport;

/// Build a renderable scene from a description.
///
/// The description is validated first, so every object's material name
/// resolves. Each material is created once and shared by all objects that
/// name it.
///
/// # Example
///
/// ```ignore
/// use ember_core::SceneDescription;
/// use ember_renderer::build_scene;
///
/// let description = SceneDescription::load("cornell.json")?;
/// let scene = build_scene(&description)?;
/// ```
pub fn build_scene(description: &SceneDescription) -> SceneResult<Scene> {
    description.validate()?;

    let materials: HashMap<&str, Arc<dyn Material>> = description
        .materials
        .iter()
        .map(|(name, material)| (name.as_str(), build_material(material)))
        .collect();

    let mut scene = Scene::new(build_background(&description.background));
    for object in &description.objects {
        let material = object
            .material()
            .and_then(|name| materials.get(name).cloned());
        scene.add(build_object(object, material));
    }

    log::info!(
        "Built scene {} with {} objects and {} materials",
        description.name.as_deref().unwrap_or("unnamed"),
        scene.len(),
        materials.len()
    );
    Ok(scene)
}

fn build_object(
    object: &ObjectDescription,
    material: Option<Arc<dyn Material>>,
) -> Arc<dyn crate::hittable::Hittable> {
    match object {
        ObjectDescription::Sphere { center, radius, .. } => {
            let sphere = Sphere::new(*center, *radius);
            Arc::new(match material {
                Some(m) => sphere.with_material(m),
                None => sphere,
            })
        }
        ObjectDescription::Box {
            transform, extents, ..
        } => {
            let cuboid = Cuboid::new(transform.to_transform(), *extents);
            Arc::new(match material {
                Some(m) => cuboid.with_material(m),
                None => cuboid,
            })
        }
        ObjectDescription::Rect {
            transform,
            width,
            height,
            ..
        } => {
            let rect = Rect::new(transform.to_transform(), *width, *height);
            Arc::new(match material {
                Some(m) => rect.with_material(m),
                None => rect,
            })
        }
    }
}

/// Create a material from its description.
pub fn build_material(description: &MaterialDescription) -> Arc<dyn Material> {
    match description {
        MaterialDescription::Lambertian { albedo } => {
            Arc::new(Lambertian::from_texture(build_texture(albedo)))
        }
        MaterialDescription::Metal { albedo, roughness } => Arc::new(Metal::new(*albedo, *roughness)),
        MaterialDescription::Dielectric {
            albedo,
            refractive_index,
        } => Arc::new(Dielectric::new(*refractive_index).with_albedo(*albedo)),
        MaterialDescription::DiffuseLight { emit } => {
            Arc::new(DiffuseLight::from_texture(build_texture(emit)))
        }
    }
}

/// Create a texture from its description.
pub fn build_texture(description: &TextureDescription) -> Arc<dyn Texture> {
    match description {
        TextureDescription::Constant(color) => Arc::new(ConstantTexture::new(*color)),
        TextureDescription::Checker { checker } => Arc::new(
            CheckerTexture::from_colors(checker.even, checker.odd).with_frequency(checker.frequency),
        ),
    }
}

/// Camera for `viewport`, aimed and focused as described.
pub fn build_camera(description: &CameraDescription, viewport: Viewport) -> Camera {
    Camera::look_at(
        description.position,
        description.look_at,
        description.up,
        description.vfov_degrees,
        viewport.aspect(),
    )
    .with_lens(description.aperture, description.focus_distance())
}

pub fn build_background(description: &BackgroundDescription) -> Background {
    Background::new(description.bottom, description.top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Hittable;
    use ember_core::SceneError;
    use ember_math::{Color, Interval, Ray, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCENE: &str = r#"{
        "camera": { "position": [0, 0, 10], "look_at": [0, 0, 0], "vfov_degrees": 30 },
        "background": { "bottom": [0, 0, 0], "top": [1, 1, 1] },
        "materials": {
            "lamp": { "type": "diffuse_light", "emit": [4, 4, 4] },
            "floor": {
                "type": "lambertian",
                "albedo": { "checker": { "even": [1, 1, 1], "odd": [0, 0, 0] } }
            }
        },
        "objects": [
            { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "lamp" },
            { "type": "box", "extents": [2, 2, 2], "material": "floor",
              "transform": { "translation": [5, 0, 0] } },
            { "type": "rect", "width": 2, "height": 2,
              "transform": { "translation": [-5, 0, 0] } }
        ]
    }"#;

    #[test]
    fn test_build_scene() {
        let description = SceneDescription::from_json_str(SCENE).unwrap();
        let scene = build_scene(&description).unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.background().sample(Vec3::Y), Color::ONE);

        let rec = scene
            .hit(&Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z), Interval::from_min(0.001))
            .unwrap();
        assert!((rec.t - 9.0).abs() < 1e-4);
        assert_eq!(rec.emitted(), Color::splat(4.0));

        // Box moved by its transform.
        let rec = scene
            .hit(&Ray::new(Vec3::new(5.0, 0.0, 10.0), -Vec3::Z), Interval::from_min(0.001))
            .unwrap();
        assert!((rec.t - 9.0).abs() < 1e-4);
        assert!(rec.material.is_some());

        // Rect without material.
        let rec = scene
            .hit(&Ray::new(Vec3::new(-5.0, 0.0, 10.0), -Vec3::Z), Interval::from_min(0.001))
            .unwrap();
        assert!((rec.t - 10.0).abs() < 1e-4);
        assert!(rec.material.is_none());
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let mut description = SceneDescription::from_json_str(SCENE).unwrap();
        description.materials.remove("lamp");
        assert!(matches!(
            build_scene(&description),
            Err(SceneError::UnknownMaterial { index: 0, .. })
        ));
    }

    #[test]
    fn test_build_camera() {
        let description = CameraDescription::new(Vec3::new(0.0, 3.0, 4.0), Vec3::ZERO).with_lens(0.5, 5.0);
        let camera = build_camera(&description, Viewport::new(200, 100));
        assert!((camera.lens_radius() - 0.25).abs() < 1e-6);

        let mut rng = StdRng::seed_from_u64(3);
        let ray = camera.get_ray(0.5, 0.5, false, &mut rng);
        assert!((ray.direction() - Vec3::new(0.0, -0.6, -0.8)).length() < 1e-4);
    }

    #[test]
    fn test_build_checker_texture() {
        let texture = build_texture(&TextureDescription::Checker {
            checker: ember_core::CheckerDescription {
                even: Color::ONE,
                odd: Color::ZERO,
                frequency: Vec3::ONE,
            },
        });
        let a = texture.sample(Vec3::splat(0.5));
        let b = texture.sample(Vec3::new(-0.5, 0.5, 0.5));
        assert_eq!(a, Color::ONE);
        assert_eq!(b, Color::ZERO);
    }
}
