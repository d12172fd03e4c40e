//! Lumen command line renderer.
//!
//! Usage: `lumen [config.json]`
//!
//! Renders the built-in Cornell-style scene and writes a PNG. Every setting
//! has a default, so the config file only needs the fields being changed.

use anyhow::{Context, Result};
use lumen_math::Vec3;
use lumen_renderer::{
    render, AxisBox, Camera, Color, FrameLayout, HitableList, Material, PhotonMap,
    RenderConfig, Scene, Sphere,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings read from the optional JSON config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct CliConfig {
    width: u32,
    height: u32,
    output: PathBuf,
    /// Camera-ray recursion depth
    max_depth: u32,
    /// Capacity of the global photon map
    global_photons: usize,
    /// Capacity of the caustics photon map
    caustic_photons: usize,
    render: RenderConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            output: PathBuf::from("lumen.png"),
            max_depth: 5,
            global_photons: 20_000,
            caustic_photons: 10_000,
            render: RenderConfig::default(),
        }
    }
}

impl CliConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CliConfig::load(Path::new(&path))?,
        None => CliConfig::default(),
    };

    log::info!("Starting Lumen");

    let aspect = config.width as f32 / config.height.max(1) as f32;
    let mut scene = build_scene(aspect)
        .with_max_depth(config.max_depth)
        .with_photon_maps(
            PhotonMap::new(config.global_photons),
            PhotonMap::new(config.caustic_photons),
        );

    let layout = FrameLayout::packed(config.width, config.height, 3)?;
    let mut pixels = layout.allocate();
    let stats = render(&mut scene, &mut pixels, layout, &config.render)?;

    log::info!(
        "Photon pass: {} global / {} caustic photons in {:?}",
        stats.global_photons,
        stats.caustic_photons,
        stats.photon_pass
    );
    log::info!("Camera pass: {:?}", stats.camera_pass);

    save_png(&pixels, &layout, &config.output)?;
    log::info!("Saved to {}", config.output.display());

    Ok(())
}

/// Cornell-style room: colored side walls, a ceiling light, glass, metal
/// and diffuse spheres.
fn build_scene(aspect: f32) -> Scene {
    let white = Arc::new(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let red = Arc::new(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let green = Arc::new(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let light = Arc::new(Material::emissive(Color::new(1.0, 0.9, 0.8), 6.0));
    let glass = Arc::new(Material::dielectric(1.5));
    let metal = Arc::new(Material::metal(Color::new(0.8, 0.85, 0.9), 0.05));
    let clay = Arc::new(Material::lambertian(Color::new(0.2, 0.3, 0.7)));

    let mut objects = HitableList::new();

    // Walls
    objects.add(AxisBox::new(Vec3::new(-2.0, -0.1, -2.0), Vec3::new(2.0, 0.0, 2.0), white.clone()));
    objects.add(AxisBox::new(Vec3::new(-2.0, 4.0, -2.0), Vec3::new(2.0, 4.1, 2.0), white.clone()));
    objects.add(AxisBox::new(Vec3::new(-2.0, 0.0, -2.1), Vec3::new(2.0, 4.0, -2.0), white));
    objects.add(AxisBox::new(Vec3::new(-2.1, 0.0, -2.0), Vec3::new(-2.0, 4.0, 2.0), red));
    objects.add(AxisBox::new(Vec3::new(2.0, 0.0, -2.0), Vec3::new(2.1, 4.0, 2.0), green));

    // Ceiling light
    objects.add(AxisBox::new(Vec3::new(-0.6, 3.9, -0.6), Vec3::new(0.6, 3.98, 0.6), light));

    objects.add(Sphere::new(Vec3::new(0.8, 0.7, 0.4), 0.7, glass));
    objects.add(Sphere::new(Vec3::new(-0.9, 0.8, -0.9), 0.8, metal));
    objects.add(Sphere::new(Vec3::new(1.0, 0.35, -1.3), 0.35, clay));

    let eye = Vec3::new(0.0, 2.0, 7.5);
    let camera = Camera::new(eye, Vec3::new(0.0, 1.8, 0.0), Vec3::Y, 40.0, aspect);
    Scene::new(objects, camera)
}

/// Encode a packed B,G,R buffer as an RGB PNG.
fn save_png(pixels: &[u8], layout: &FrameLayout, path: &Path) -> Result<()> {
    let bpp = layout.bytes_per_pixel();
    let mut rgb = Vec::with_capacity(layout.width() as usize * layout.height() as usize * 3);

    for row in 0..layout.height() {
        let offset = layout.row_offset(row);
        for bgr in pixels[offset..offset + layout.row_bytes()].chunks_exact(bpp) {
            rgb.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
        }
    }

    let image = image::RgbImage::from_raw(layout.width(), layout.height(), rgb)
        .context("Pixel buffer does not match the image size")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
