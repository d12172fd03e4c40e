//! Camera-ray integrator.
//!
//! Diffuse hits combine hard-shadowed direct light from every light with
//! photon map density estimates. Specular and refractive hits recurse along
//! a single continuation ray until the scene's depth limit is reached.

use crate::{
    gen_f32, orient_normal, scatter_dielectric, scatter_lambertian, scatter_metal, Color,
    IndirectMode, Material, PhotonMap, RenderConfig, Scene,
};
use lumen_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::FRAC_1_PI;

/// Shades camera rays against a scene with frozen photon maps.
///
/// Holds only shared references, so one integrator serves every worker.
#[derive(Debug, Clone, Copy)]
pub struct Integrator<'a> {
    scene: &'a Scene,
    config: &'a RenderConfig,
}

impl<'a> Integrator<'a> {
    pub fn new(scene: &'a Scene, config: &'a RenderConfig) -> Self {
        Self { scene, config }
    }

    /// Radiance arriving along a camera ray.
    pub fn radiance(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        self.trace(ray, self.scene.max_depth(), true, rng)
    }

    /// Recursive radiance evaluation.
    ///
    /// `count_emission` is false on path-traced diffuse bounces, whose light
    /// hits are already accounted for by the direct term.
    fn trace(&self, ray: &Ray, depth: u32, count_emission: bool, rng: &mut dyn RngCore) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }

        let Some((_, hit)) = self.scene.intersect(ray) else {
            return Color::ZERO;
        };

        let p = ray.at(hit.t);
        let (normal, material) = hit.surface(p);
        let incident = ray.direction().normalize();

        match material {
            Material::Emissive { .. } => {
                if count_emission {
                    material.emitted()
                } else {
                    Color::ZERO
                }
            }
            Material::DebugNormal => 0.5 * (normal + Vec3::ONE),
            Material::Metal { albedo, roughness } => {
                match scatter_metal(incident, normal, *roughness, rng) {
                    Some(direction) => {
                        *albedo * self.trace(&Ray::new(p, direction), depth - 1, true, rng)
                    }
                    None => Color::ZERO,
                }
            }
            Material::Dielectric { ior } => {
                let (direction, _) = scatter_dielectric(incident, normal, *ior, gen_f32(rng));
                self.trace(&Ray::new(p, direction), depth - 1, true, rng)
            }
            Material::Lambertian { albedo } => {
                let oriented = orient_normal(normal, incident);
                self.direct(p, oriented, *albedo)
                    + self.caustics(p, oriented, *albedo)
                    + self.indirect(p, oriented, *albedo, depth, rng)
            }
        }
    }

    /// Hard-shadowed light from every light's sample point.
    fn direct(&self, p: Vec3, normal: Vec3, albedo: Color) -> Color {
        let objects = self.scene.objects();
        let mut total = Color::ZERO;

        for light in self.scene.lights().iter().filter_map(|&index| objects.get(index)) {
            let target = light.position();
            let to_light = (target - p).normalize_or_zero();
            let cosine = normal.dot(to_light).max(0.0);
            if cosine <= 0.0 || self.scene.occluded(p, target) {
                continue;
            }
            total += albedo * cosine * light.material().emitted();
        }

        total
    }

    fn caustics(&self, p: Vec3, normal: Vec3, albedo: Color) -> Color {
        let photons = &self.config.photons;
        self.estimate(self.scene.caustic_map(), p, normal, photons.caustic_radius, albedo)
    }

    fn indirect(
        &self,
        p: Vec3,
        normal: Vec3,
        albedo: Color,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        match self.config.indirect {
            IndirectMode::PhotonMap => {
                let photons = &self.config.photons;
                self.estimate(self.scene.global_map(), p, normal, photons.global_radius, albedo)
            }
            IndirectMode::PathTraced => {
                let direction = scatter_lambertian(normal, rng);
                albedo * self.trace(&Ray::new(p, direction), depth - 1, false, rng)
            }
            IndirectMode::None => Color::ZERO,
        }
    }

    /// Reflected radiance from a photon map estimate under a Lambertian BRDF.
    fn estimate(
        &self,
        map: Option<&PhotonMap>,
        p: Vec3,
        normal: Vec3,
        radius: Option<f32>,
        albedo: Color,
    ) -> Color {
        match map {
            Some(map) if !map.is_empty() => {
                let irradiance =
                    map.irradiance_estimate(p, normal, radius, self.config.photons.estimate_count);
                irradiance * FRAC_1_PI * albedo
            }
            _ => Color::ZERO,
        }
    }
}
