//! # ember
//!
//! Command line front end for the Ember renderer. Renders a built-in preset
//! or a JSON scene file with any of the integrators and writes the result
//! as PPM or PNG.
//!
//! The render runs on the renderer's worker pool while the main thread polls
//! its progress for the progress bar.

mod presets;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::SceneDescription;
use ember_renderer::{
    build_camera, build_scene, save_image, BucketOrder, Camera, Framebuffer, Image, PixelRenderer,
    Preview, PreviewSettings, Raymarch, RaymarchSettings, Raytrace, RaytraceSettings, RenderConfig,
    RenderState, Renderer, Scene, Viewport, VisualizeMode, Visualizer, WorkUnit,
    DEFAULT_BUCKET_SIZE,
};
use indicatif::{ProgressBar, ProgressStyle};
use presets::ScenePreset;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Resolution for scene files that do not come with one.
const DEFAULT_RESOLUTION: (u32, u32) = (400, 400);

/// ember: offline ray tracer and sphere tracer
#[derive(Parser, Debug)]
#[command(
    name = "ember",
    version,
    about = "Offline CPU ray tracer and sphere tracer",
    after_help = "EXAMPLES:\n  \
                  ember --scene cornell --spp 200 --output cornell.png\n  \
                  ember --scene weekend --seed 7 --threads 8 -W 600 -H 375\n  \
                  ember --scene shapes --integrator raymarch --spp 16\n  \
                  ember --file scene.json --integrator normals --order raster\n  \
                  ember --scene glass --export-scene glass.json --quiet"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Cornell)]
    scene: ScenePreset,

    /// Render a JSON scene file instead of a preset
    #[arg(short, long, conflicts_with = "scene")]
    file: Option<PathBuf>,

    /// How pixels are computed
    #[arg(short, long, value_enum, default_value_t = Integrator::Raytrace)]
    integrator: Integrator,

    /// Image width in pixels (defaults to the preset's)
    #[arg(short = 'W', long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Image height in pixels (defaults to the preset's)
    #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum scatter events per path
    #[arg(long)]
    bounces: Option<u32>,

    /// Distance after which a marched ray counts as escaped
    #[arg(long)]
    max_ray_length: Option<f32>,

    /// Surface threshold for the sphere tracer
    #[arg(long)]
    hit_epsilon: Option<f32>,

    /// Edge length of the square tiles handed to workers
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    tile_size: u32,

    /// Hand out single pixels instead of tiles
    #[arg(long)]
    pixels: bool,

    /// Order in which tiles are rendered
    #[arg(long, value_enum, default_value_t = CliOrder::Spiral)]
    order: CliOrder,

    /// Worker threads (defaults to the available parallelism)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Seed for the preset layout and the worker generators
    #[arg(long)]
    seed: Option<u64>,

    /// Output image, `.ppm` or `.png`
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Also write the scene description as JSON
    #[arg(long)]
    export_scene: Option<PathBuf>,

    /// Hide the progress bar and informational logging
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Integrator {
    /// Recursive path tracing with analytic intersections
    Raytrace,
    /// Path tracing with sphere-traced intersections
    Raymarch,
    /// One bounce straight to the background
    Preview,
    /// Distance to the first hit
    Depth,
    /// Surface normals of the first hit
    Normals,
    /// Path length in scatter events
    Bounces,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOrder {
    /// Row by row from the bottom
    Raster,
    /// Outward from the image center
    Spiral,
}

impl From<CliOrder> for BucketOrder {
    fn from(order: CliOrder) -> Self {
        match order {
            CliOrder::Raster => BucketOrder::Raster,
            CliOrder::Spiral => BucketOrder::Spiral,
        }
    }
}

impl Cli {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            unit: if self.pixels {
                WorkUnit::Pixels
            } else {
                WorkUnit::Tiles(self.tile_size)
            },
            order: self.order.into(),
            threads: self.threads,
            seed: self.seed,
        }
    }

    fn load_scene(&self) -> Result<(SceneDescription, (u32, u32))> {
        if let Some(path) = &self.file {
            let description = SceneDescription::load(path)
                .with_context(|| format!("failed to load scene {}", path.display()))?;
            return Ok((description, DEFAULT_RESOLUTION));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok((self.scene.build(&mut rng), self.scene.resolution()))
    }

    fn integrator(
        &self,
        scene: Arc<Scene>,
        camera: Camera,
        target: Arc<dyn Framebuffer>,
    ) -> Arc<dyn PixelRenderer> {
        let mode = match self.integrator {
            Integrator::Raytrace => {
                let mut settings = RaytraceSettings::default();
                settings.samples_per_pixel = self.spp.unwrap_or(settings.samples_per_pixel);
                settings.max_bounces = self.bounces.unwrap_or(settings.max_bounces);
                return Arc::new(Raytrace::new(scene, camera, target).with_settings(settings));
            }
            Integrator::Raymarch => {
                let mut settings = RaymarchSettings::default();
                settings.samples_per_pixel = self.spp.unwrap_or(settings.samples_per_pixel);
                settings.max_bounces = self.bounces.unwrap_or(settings.max_bounces);
                settings.max_ray_length = self.max_ray_length.unwrap_or(settings.max_ray_length);
                settings.hit_epsilon = self.hit_epsilon.unwrap_or(settings.hit_epsilon);
                return Arc::new(Raymarch::new(scene, camera, target).with_settings(settings));
            }
            Integrator::Preview => {
                let mut settings = PreviewSettings::default();
                settings.samples_per_pixel = self.spp.unwrap_or(settings.samples_per_pixel);
                return Arc::new(Preview::new(scene, camera, target).with_settings(settings));
            }
            Integrator::Depth => VisualizeMode::Depth,
            Integrator::Normals => VisualizeMode::Normal,
            Integrator::Bounces => VisualizeMode::Bounces,
        };

        let visualizer = Visualizer::new(scene, &camera, target, mode);
        match self.bounces {
            Some(bounces) => Arc::new(visualizer.with_max_bounces(bounces)),
            None => Arc::new(visualizer),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let (description, (default_width, default_height)) = cli.load_scene()?;
    if let Some(path) = &cli.export_scene {
        std::fs::write(path, description.to_json()?)
            .with_context(|| format!("failed to write scene {}", path.display()))?;
        log::info!("Scene written to {}", path.display());
    }

    let viewport = Viewport::new(
        cli.width.unwrap_or(default_width),
        cli.height.unwrap_or(default_height),
    );
    let scene = Arc::new(build_scene(&description).context("invalid scene")?);
    let camera = build_camera(&description.camera, viewport);
    let image = Arc::new(Image::new(viewport.width, viewport.height));

    log::info!(
        "Rendering {} with {:?} at {}x{}",
        description.name.as_deref().unwrap_or("scene"),
        cli.integrator,
        viewport.width,
        viewport.height
    );

    let task = cli.integrator(scene, camera, image.clone());
    let renderer = Renderer::new(cli.render_config());
    let started = Instant::now();
    renderer.set_finish_callback(move || {
        log::info!("Render finished in {:.2?}", started.elapsed());
    });
    renderer.render_async(task)?;

    let bar = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} buckets ({eta})",
    )?);
    while renderer.state() != RenderState::Finished {
        let (claimed, total) = renderer.progress();
        bar.set_length(total as u64);
        bar.set_position(claimed as u64);
        thread::sleep(Duration::from_millis(100));
    }
    renderer.wait_for_finish().context("render failed")?;
    bar.finish_and_clear();

    let path = save_image(&cli.output, &image)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    if cli.quiet {
        println!("{}", path.display());
    }

    Ok(())
}
