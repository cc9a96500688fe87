//! Built-in scene presets.
//!
//! Presets produce plain `SceneDescription`s, so any of them can be
//! exported to JSON and edited by hand.

use ember_core::{
    BackgroundDescription, CameraDescription, CheckerDescription, MaterialDescription,
    ObjectDescription, SceneDescription, TextureDescription, TransformDescription,
};
use ember_math::{Color, Vec3};
use rand::Rng;

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenePreset {
    /// A field of small random spheres around three large ones: diffuse,
    /// metal and glass.
    Weekend,
    /// Cornell box lit by a ceiling panel, with two rotated boxes.
    Cornell,
    /// Glass, metal and diffuse spheres and tilted boxes over a metal slab.
    Shapes,
    /// A mirror sphere surrounded by three colored area lights.
    Lights,
    /// A hollow glass sphere on a checker floor.
    Glass,
}

impl ScenePreset {
    /// Build the scene. Only `Weekend` draws from `rng`.
    pub fn build(self, rng: &mut impl Rng) -> SceneDescription {
        match self {
            ScenePreset::Weekend => build_weekend(rng),
            ScenePreset::Cornell => build_cornell(),
            ScenePreset::Shapes => build_shapes(),
            ScenePreset::Lights => build_lights(),
            ScenePreset::Glass => build_glass(),
        }
    }

    /// Resolution used when none is given on the command line.
    pub fn resolution(self) -> (u32, u32) {
        match self {
            ScenePreset::Weekend => (1024, 640),
            ScenePreset::Cornell => (256, 256),
            ScenePreset::Shapes | ScenePreset::Lights => (512, 256),
            ScenePreset::Glass => (480, 300),
        }
    }
}

fn lambertian(albedo: Color) -> MaterialDescription {
    MaterialDescription::Lambertian {
        albedo: albedo.into(),
    }
}

fn metal(albedo: Color, roughness: f32) -> MaterialDescription {
    MaterialDescription::Metal { albedo, roughness }
}

fn dielectric(albedo: Color, refractive_index: f32) -> MaterialDescription {
    MaterialDescription::Dielectric {
        albedo,
        refractive_index,
    }
}

fn light(emit: Color) -> MaterialDescription {
    MaterialDescription::DiffuseLight { emit: emit.into() }
}

fn sphere(center: Vec3, radius: f32, material: &str) -> ObjectDescription {
    ObjectDescription::Sphere {
        center,
        radius,
        material: Some(material.to_string()),
    }
}

fn cuboid(transform: TransformDescription, extents: Vec3, material: &str) -> ObjectDescription {
    ObjectDescription::Box {
        transform,
        extents,
        material: Some(material.to_string()),
    }
}

fn rect(transform: TransformDescription, width: f32, height: f32, material: &str) -> ObjectDescription {
    ObjectDescription::Rect {
        transform,
        width,
        height,
        material: Some(material.to_string()),
    }
}

/// Translation followed by a rotation of `degrees` about `axis`.
fn placed(translation: Vec3, axis: Vec3, degrees: f32) -> TransformDescription {
    TransformDescription::from_translation(translation).with_rotation(axis, degrees)
}

fn build_weekend(rng: &mut impl Rng) -> SceneDescription {
    let position = Vec3::new(13.0, 2.0, 3.0);
    let look_at = Vec3::new(0.0, 0.5, 0.0);
    let focus_distance = (look_at - position).length() - 4.0;
    let camera = CameraDescription::new(position, look_at)
        .with_fov(20.0)
        .with_lens(0.25, focus_distance);

    let mut scene = SceneDescription::new(camera)
        .with_name("weekend")
        .with_background(BackgroundDescription {
            bottom: Color::new(0.619, 1.0, 0.694),
            top: Color::new(1.0, 0.639, 0.619),
        });

    scene.add_material("ground", lambertian(Color::splat(0.5)));
    scene.add_object(sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, "ground"));

    for i in -11..11 {
        for j in -11..11 {
            let chooser: f32 = rng.gen();
            let material = if chooser > 0.9 {
                dielectric(Color::ONE, 1.2 + rng.gen::<f32>() * 0.5)
            } else if chooser > 0.6 {
                metal(Color::new(rng.gen(), rng.gen(), rng.gen()), rng.gen())
            } else {
                lambertian(Color::new(rng.gen(), rng.gen(), rng.gen()))
            };
            let name = format!("small_{}_{}", i, j);
            scene.add_material(name.clone(), material);

            let center = Vec3::new(
                i as f32 + rng.gen::<f32>() * 2.0 - 1.0,
                0.2 + rng.gen::<f32>() * 0.2,
                j as f32 + rng.gen::<f32>() * 2.0 - 1.0,
            );
            scene.add_object(sphere(center, 0.2, &name));
        }
    }

    scene.add_material("matte", lambertian(Color::new(0.0, 1.0, 0.32)));
    scene.add_material("bronze", metal(Color::new(0.7, 0.6, 0.5), 0.0));
    scene.add_material("glass", dielectric(Color::ONE, 1.5));
    scene.add_object(sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, "matte"));
    scene.add_object(sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, "bronze"));
    scene.add_object(sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, "glass"));

    scene
}

fn build_cornell() -> SceneDescription {
    let camera = CameraDescription::new(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0))
        .with_fov(40.0)
        .with_lens(0.0, 10.0);
    let mut scene = SceneDescription::new(camera)
        .with_name("cornell")
        .with_background(BackgroundDescription::uniform(Color::ZERO));

    scene.add_material("red", lambertian(Color::new(0.65, 0.05, 0.05)));
    scene.add_material("white", lambertian(Color::splat(0.73)));
    scene.add_material("green", lambertian(Color::new(0.12, 0.45, 0.15)));
    scene.add_material("light", light(Color::splat(15.0)));

    let side = 555.0;
    let half = side * 0.5;
    scene.add_object(rect(placed(Vec3::new(side, half, half), Vec3::Y, -90.0), side, side, "red"));
    scene.add_object(rect(placed(Vec3::new(0.0, half, half), Vec3::Y, 90.0), side, side, "green"));
    scene.add_object(rect(
        placed(Vec3::new(278.0, 554.0, 279.5), Vec3::X, -90.0),
        130.0,
        105.0,
        "light",
    ));
    scene.add_object(rect(placed(Vec3::new(half, side, half), Vec3::X, 90.0), side, side, "white"));
    scene.add_object(rect(placed(Vec3::new(half, 0.0, half), Vec3::X, -90.0), side, side, "white"));
    scene.add_object(rect(placed(Vec3::new(half, half, side), Vec3::X, 180.0), side, side, "white"));

    scene.add_object(cuboid(
        placed(Vec3::new(185.5, 82.5, 169.0), Vec3::Y, -18.0),
        Vec3::splat(165.0),
        "white",
    ));
    scene.add_object(cuboid(
        placed(Vec3::new(368.5, 165.0, 351.5), Vec3::Y, 15.0),
        Vec3::new(165.0, 330.0, 165.0),
        "white",
    ));

    scene
}

fn build_shapes() -> SceneDescription {
    let camera = CameraDescription::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO).with_fov(20.0);
    let mut scene = SceneDescription::new(camera)
        .with_name("shapes")
        .with_background(BackgroundDescription {
            bottom: Color::new(0.8, 0.3, 0.1),
            top: Color::new(0.2, 0.7, 0.9),
        });

    scene.add_material("ground", metal(Color::splat(0.6), 0.02));
    scene.add_material("amber_glass", dielectric(Color::new(0.9, 0.4, 0.2), 1.5));
    scene.add_material("green_metal", metal(Color::new(0.15, 0.7, 0.15), 0.0));
    scene.add_material("blue", lambertian(Color::new(0.1, 0.2, 0.7)));
    scene.add_material("teal_glass", dielectric(Color::new(0.1, 0.9, 0.8), 1.8));
    scene.add_material("violet_metal", metal(Color::new(0.7, 0.2, 0.9), 0.0));
    scene.add_material("lime", lambertian(Color::new(0.7, 0.9, 0.2)));

    let slab = TransformDescription {
        scale: 200.0,
        ..TransformDescription::from_translation(Vec3::new(0.0, -100.55, -3.0))
    };
    scene.add_object(cuboid(slab, Vec3::ONE, "ground"));

    scene.add_object(sphere(Vec3::new(-1.0, 0.0, 0.0), 0.5, "amber_glass"));
    scene.add_object(sphere(Vec3::new(-0.8, 0.0, -2.0), 0.5, "green_metal"));
    scene.add_object(sphere(Vec3::new(-0.6, 0.0, -4.0), 0.5, "blue"));

    let tilted = |translation: Vec3| TransformDescription {
        scale: 0.6,
        ..placed(translation, Vec3::new(1.0, 1.0, 0.0), 45.0)
    };
    scene.add_object(cuboid(tilted(Vec3::new(1.0, 0.0, 0.0)), Vec3::ONE, "teal_glass"));
    scene.add_object(cuboid(tilted(Vec3::new(0.8, 0.0, -2.0)), Vec3::ONE, "violet_metal"));
    scene.add_object(cuboid(tilted(Vec3::new(0.6, 0.0, -4.0)), Vec3::ONE, "lime"));

    scene
}

fn build_lights() -> SceneDescription {
    let camera = CameraDescription::new(Vec3::new(0.0, 2.0, 8.0), Vec3::new(0.0, 1.0, 0.0)).with_fov(35.0);
    let mut scene = SceneDescription::new(camera)
        .with_name("lights")
        .with_background(BackgroundDescription::uniform(Color::splat(0.02)));

    scene.add_material("floor", lambertian(Color::splat(0.5)));
    scene.add_material("mirror", metal(Color::splat(0.9), 0.05));
    scene.add_object(rect(placed(Vec3::ZERO, Vec3::X, -90.0), 30.0, 30.0, "floor"));
    scene.add_object(sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, "mirror"));

    let colors = [
        ("red_light", Color::new(4.0, 0.4, 0.4)),
        ("green_light", Color::new(0.4, 4.0, 0.4)),
        ("blue_light", Color::new(0.4, 0.4, 4.0)),
    ];
    for (k, (name, emit)) in colors.into_iter().enumerate() {
        let angle = 60.0 + 120.0 * k as f32;
        let (sin, cos) = angle.to_radians().sin_cos();
        let center = Vec3::new(4.0 * sin, 1.5, 4.0 * cos);
        scene.add_material(name, light(emit));
        // Turned to face the sphere.
        scene.add_object(rect(placed(center, Vec3::Y, angle + 180.0), 2.0, 2.0, name));
    }

    scene
}

fn build_glass() -> SceneDescription {
    let camera = CameraDescription::new(Vec3::new(0.0, 1.5, 6.0), Vec3::new(0.0, 1.0, 0.0)).with_fov(30.0);
    let mut scene = SceneDescription::new(camera)
        .with_name("glass")
        .with_background(BackgroundDescription {
            bottom: Color::ONE,
            top: Color::new(0.5, 0.7, 1.0),
        });

    scene.add_material(
        "checker",
        MaterialDescription::Lambertian {
            albedo: TextureDescription::Checker {
                checker: CheckerDescription {
                    even: Color::splat(0.9),
                    odd: Color::new(0.2, 0.3, 0.1),
                    frequency: Vec3::splat(10.0),
                },
            },
        },
    );
    scene.add_material("glass", dielectric(Color::ONE, 1.5));
    scene.add_material("red", lambertian(Color::new(0.7, 0.15, 0.15)));
    scene.add_material("steel", metal(Color::new(0.8, 0.8, 0.85), 0.1));

    scene.add_object(rect(placed(Vec3::ZERO, Vec3::X, -90.0), 40.0, 40.0, "checker"));
    // Outer surface and an inside-out inner surface make a thin shell.
    scene.add_object(sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, "glass"));
    scene.add_object(sphere(Vec3::new(0.0, 1.0, 0.0), -0.9, "glass"));
    scene.add_object(sphere(Vec3::new(-2.2, 0.7, -1.5), 0.7, "red"));
    scene.add_object(sphere(Vec3::new(2.2, 0.7, -1.5), 0.7, "steel"));

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_all_presets_validate() {
        let mut rng = StdRng::seed_from_u64(0);
        for preset in ScenePreset::value_variants() {
            let scene = preset.build(&mut rng);
            assert!(scene.validate().is_ok(), "{:?}", preset);
            assert!(!scene.objects.is_empty());
        }
    }

    #[test]
    fn test_weekend_is_seeded() {
        let a = ScenePreset::Weekend.build(&mut StdRng::seed_from_u64(5));
        let b = ScenePreset::Weekend.build(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
        // Ground, 22 x 22 small spheres and three large ones.
        assert_eq!(a.objects.len(), 1 + 22 * 22 + 3);
    }

    #[test]
    fn test_cornell_layout() {
        let scene = ScenePreset::Cornell.build(&mut StdRng::seed_from_u64(0));
        assert_eq!(scene.objects.len(), 8);
        assert_eq!(scene.camera.position, Vec3::new(278.0, 278.0, -800.0));
        let lights = scene
            .objects
            .iter()
            .filter(|o| o.material() == Some("light"))
            .count();
        assert_eq!(lights, 1);
    }

    #[test]
    fn test_glass_has_inverted_shell() {
        let scene = ScenePreset::Glass.build(&mut StdRng::seed_from_u64(0));
        assert!(scene
            .objects
            .iter()
            .any(|o| matches!(o, ObjectDescription::Sphere { radius, .. } if *radius < 0.0)));
    }
}
