//! Render entry points.
//!
//! A render runs in two phases:
//! - Photon pass: single-threaded emission into the scene's photon maps,
//!   followed by balancing and power normalization.
//! - Camera pass: every scanline is shaded on the worker pool, with
//!   jittered multi-sampling, gamma correction and 8-bit quantization.

use crate::frame::FrameLayout;
use crate::integrator::Integrator;
use crate::scanline::render_rows;
use crate::{gen_f32, Camera, Color, RenderResult, Scene};
use lumen_math::Vec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How diffuse surfaces gather light that is neither direct nor caustic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndirectMode {
    /// Density estimate from the global photon map.
    PhotonMap,
    /// Recursive cosine-weighted bounce (path tracing).
    PathTraced,
    /// Direct light and caustics only.
    None,
}

/// Photon emission and density estimation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotonConfig {
    /// Maximum number of surface interactions per photon path
    pub max_bounces: u32,
    /// Photons gathered per density estimate
    pub estimate_count: usize,
    /// Fixed gather radius for the global map (adaptive when unset)
    pub global_radius: Option<f32>,
    /// Fixed gather radius for the caustics map (adaptive when unset)
    pub caustic_radius: Option<f32>,
    /// Normalization constant; photon power is scaled by this over capacity
    pub power_scale: f32,
    /// Direction lights emit around
    pub emission_normal: [f32; 3],
    /// Emitted photons allowed per photon of a light's quota
    pub attempts_per_photon: u32,
}

impl Default for PhotonConfig {
    fn default() -> Self {
        Self {
            max_bounces: 4,
            estimate_count: 100,
            global_radius: None,
            caustic_radius: None,
            power_scale: 1.0,
            emission_normal: [0.0, -1.0, 0.0],
            attempts_per_photon: 200,
        }
    }
}

impl PhotonConfig {
    pub fn emission_normal(&self) -> Vec3 {
        Vec3::from_array(self.emission_normal).normalize_or(Vec3::NEG_Y)
    }
}

/// Render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Camera rays per pixel
    pub samples_per_pixel: u32,
    /// Worker threads for the camera pass (0 = available parallelism)
    pub threads: usize,
    /// Base seed for the photon pass and every scanline
    pub seed: u64,
    /// Indirect diffuse lighting strategy
    pub indirect: IndirectMode,
    pub photons: PhotonConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 8,
            threads: 0,
            seed: 0x5EED,
            indirect: IndirectMode::PhotonMap,
            photons: PhotonConfig::default(),
        }
    }
}

/// Timings and photon counts of a finished render.
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    pub global_photons: usize,
    pub caustic_photons: usize,
    pub photon_pass: Duration,
    pub camera_pass: Duration,
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to gamma-corrected 8-bit B,G,R.
pub fn color_to_bgr(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (255.99 * clamp_01(linear_to_gamma(c))) as u8;
    [quantize(color.z), quantize(color.y), quantize(color.x)]
}

/// Average of `samples` jittered camera rays through pixel (x, y).
pub fn render_pixel(
    integrator: &Integrator<'_>,
    camera: &Camera,
    x: u32,
    y: u32,
    layout: &FrameLayout,
    samples: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = samples.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let s = (x as f32 + gen_f32(rng)) / layout.width() as f32;
        let t = (y as f32 + gen_f32(rng)) / layout.height() as f32;
        let ray = camera.get_ray(s, t);
        pixel_color += integrator.radiance(&ray, rng);
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Render the scene into a caller-owned B,G,R(,pad) buffer.
///
/// Runs the photon pass first if the scene's photon maps have not been
/// populated yet.
pub fn render(
    scene: &mut Scene,
    pixels: &mut [u8],
    layout: FrameLayout,
    config: &RenderConfig,
) -> RenderResult<RenderStats> {
    layout.check_buffer(pixels.len())?;

    let start = Instant::now();
    if !scene.photons_emitted() {
        let mut rng = StdRng::seed_from_u64(config.seed);
        scene.emit_photons(&config.photons, &mut rng);
    }
    let photon_pass = start.elapsed();

    let camera_pass = render_frame(scene, pixels, layout, config)?;

    Ok(RenderStats {
        global_photons: scene.global_map().map_or(0, |m| m.len()),
        caustic_photons: scene.caustic_map().map_or(0, |m| m.len()),
        photon_pass,
        camera_pass,
    })
}

/// Camera pass only: shade every pixel of a scene whose photon maps are frozen.
pub fn render_frame(
    scene: &Scene,
    pixels: &mut [u8],
    layout: FrameLayout,
    config: &RenderConfig,
) -> RenderResult<Duration> {
    layout.check_buffer(pixels.len())?;

    log::info!(
        "Rendering {}x{} @ {} spp",
        layout.width(),
        layout.height(),
        config.samples_per_pixel
    );

    let start = Instant::now();
    let integrator = Integrator::new(scene, config);
    let camera = scene.camera();

    render_rows(pixels, &layout, config.threads, config.seed, |x, y, rng| {
        let samples = config.samples_per_pixel;
        color_to_bgr(render_pixel(&integrator, camera, x, y, &layout, samples, rng))
    })?;

    let elapsed = start.elapsed();
    log::info!("Rendered in {:?}", elapsed);
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisBox, Hitable, Material, PhotonMap, RenderError, Sphere};
    use std::sync::Arc;

    const WIDTH: u32 = 32;
    const HEIGHT: u32 = 32;

    /// Unit diffuse sphere under a bright overhead area light.
    fn sphere_scene() -> Scene {
        let objects: Vec<Hitable> = vec![
            Sphere::new(
                Vec3::ZERO,
                1.0,
                Arc::new(Material::lambertian(Color::splat(0.5))),
            )
            .into(),
            AxisBox::new(
                Vec3::new(-0.5, 2.0, -0.5),
                Vec3::new(0.5, 2.1, 0.5),
                Arc::new(Material::emissive(Color::ONE, 50.0)),
            )
            .into(),
        ];
        let camera = Camera::new(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO, Vec3::Y, 30.0, 1.0);
        Scene::new(objects, camera).with_photon_maps(PhotonMap::new(500), PhotonMap::new(100))
    }

    fn render_sphere(threads: usize) -> Vec<u8> {
        let _ = env_logger::builder().is_test(true).try_init();

        let layout = FrameLayout::new(WIDTH, HEIGHT, WIDTH as usize * 4, 4).unwrap();
        let config = RenderConfig {
            samples_per_pixel: 1,
            threads,
            seed: 1234,
            ..Default::default()
        };
        let mut pixels = layout.allocate();
        let mut scene = sphere_scene();
        let stats = render(&mut scene, &mut pixels, layout, &config).unwrap();

        assert!(scene.photons_emitted());
        assert_eq!(stats.caustic_photons, 0);
        assert!(stats.global_photons > 0);
        pixels
    }

    fn pixel(pixels: &[u8], x: u32, y: u32) -> &[u8] {
        let offset = (y * WIDTH + x) as usize * 4;
        &pixels[offset..offset + 4]
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_bgr() {
        // Channel order is reversed and values are gamma corrected then clamped
        assert_eq!(color_to_bgr(Color::new(1.0, 0.25, 0.0)), [0, 127, 255]);
        assert_eq!(color_to_bgr(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_bgr(Color::splat(-1.0)), [0, 0, 0]);
    }

    #[test]
    fn test_sphere_render_is_reproducible() {
        let first = render_sphere(1);
        let second = render_sphere(4);
        assert_eq!(first, second);
        assert!(first.chunks(4).all(|pixel| pixel[3] == crate::PAD_BYTE));
    }

    #[test]
    fn test_sphere_render_golden_pixels() {
        let pixels = render_sphere(3);
        let black = [0, 0, 0, crate::PAD_BYTE];
        let white = [255, 255, 255, crate::PAD_BYTE];

        // Top row misses the sphere and passes under the light
        for x in 0..WIDTH {
            assert_eq!(pixel(&pixels, x, 0), black, "pixel ({x}, 0)");
        }
        for (x, y) in [(0, 31), (31, 31), (0, 16), (31, 16)] {
            assert_eq!(pixel(&pixels, x, y), black, "pixel ({x}, {y})");
        }

        // Upper front of the sphere faces the light; 0.5 * cos * 50 saturates
        // wherever cos > 0.04, whichever sub-pixel position is sampled
        for (x, y) in [(15, 7), (16, 7), (15, 8), (16, 8)] {
            assert_eq!(pixel(&pixels, x, y), white, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_render_rejects_small_buffer() {
        let layout = FrameLayout::packed(8, 8, 3).unwrap();
        let mut pixels = vec![0; 16];
        let mut scene = sphere_scene();

        let result = render(&mut scene, &mut pixels, layout, &RenderConfig::default());
        assert_eq!(
            result.unwrap_err(),
            RenderError::BufferTooSmall { actual: 16, required: 192 }
        );
        assert!(!scene.photons_emitted());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let json = r#"{ "samples_per_pixel": 2, "indirect": "path_traced" }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.samples_per_pixel, 2);
        assert_eq!(config.indirect, IndirectMode::PathTraced);
        assert_eq!(config.photons.estimate_count, 100);
        assert_eq!(config.photons.emission_normal(), Vec3::NEG_Y);
    }
}
