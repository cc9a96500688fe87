//! Ember Renderer - CPU ray tracing and sphere tracing.
//!
//! Primitives answer both analytic ray queries and signed-distance queries,
//! so the same scene can be rendered by the recursive path tracer
//! (`Raytrace`), the sphere tracer (`Raymarch`), the one-bounce `Preview`
//! or the debug `Visualizer`. A `Renderer` distributes the pixels of any of
//! them over worker threads through a shared atomic counter.

mod background;
mod bucket;
mod builder;
mod camera;
mod cuboid;
mod framebuffer;
mod hittable;
mod integrator;
mod material;
mod output;
mod preview;
mod raymarch;
mod raytrace;
mod rect;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;
mod viewport;
mod visualizer;

pub use background::Background;
pub use bucket::{generate_buckets, spiral_order, Bucket, BucketOrder, WorkUnit, DEFAULT_BUCKET_SIZE};
pub use builder::{build_background, build_camera, build_material, build_scene, build_texture};
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use framebuffer::{Framebuffer, Image};
pub use hittable::{HitRecord, Hittable, SdfHit};
pub use integrator::{linear_to_gamma, sample_pixel, to_display, PixelRenderer, DISPLAY_SCALE};
pub use material::{Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use output::{save_image, write_png, write_ppm, OutputError, OutputResult};
pub use preview::{Preview, PreviewSettings};
pub use raymarch::{Raymarch, RaymarchSettings};
pub use raytrace::{Raytrace, RaytraceSettings};
pub use rect::Rect;
pub use renderer::{FinishCallback, RenderConfig, RenderError, RenderResult, RenderState, Renderer};
pub use sampling::{gen_f32, sample_unit_disk, sample_unit_sphere};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{CheckerTexture, ConstantTexture, Texture};
pub use viewport::Viewport;
pub use visualizer::{VisualizeMode, Visualizer};

/// Re-export common math types from ember_math
pub use ember_math::{Color, Interval, Ray, Transform, Vec3};
