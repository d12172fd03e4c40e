//! Photon emission pass.
//!
//! Photons leave each light from its sample position, cosine distributed
//! around the configured emission normal, and are traced through the scene
//! until a diffuse surface absorbs them. Each light gets a share of a map's
//! capacity proportional to its surface area.

use crate::{
    gen_f32, orient_normal, scatter_dielectric, scatter_lambertian, scatter_metal, Color, Material,
    PhotonConfig, PhotonMap, Scene,
};
use lumen_math::{warp, Ray};
use rand::RngCore;

/// Which map a photon path is being traced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapKind {
    Global,
    /// Only paths whose first surface is transparent are kept.
    Caustic,
}

impl MapKind {
    fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Caustic => "caustic",
        }
    }
}

impl Scene {
    /// Fill, balance and normalize the attached photon maps.
    ///
    /// Maps that were never attached are left out. The caustic map stays
    /// empty when the scene has nothing transparent to focus light.
    pub fn emit_photons(&mut self, config: &PhotonConfig, rng: &mut dyn RngCore) {
        if self.lights().is_empty() {
            log::warn!("Scene has no emissive objects, skipping photon pass");
        }

        if let Some(mut map) = self.global_map.take() {
            self.populate(&mut map, MapKind::Global, config, rng);
            self.global_map = Some(map);
        }

        if let Some(mut map) = self.caustic_map.take() {
            if self.transparent().is_empty() {
                log::debug!("No transparent objects, caustic map left empty");
                map.clear();
                map.balance();
            } else {
                self.populate(&mut map, MapKind::Caustic, config, rng);
            }
            self.caustic_map = Some(map);
        }

        self.photons_emitted = true;
    }

    fn populate(
        &self,
        map: &mut PhotonMap,
        kind: MapKind,
        config: &PhotonConfig,
        rng: &mut dyn RngCore,
    ) {
        map.clear();
        let capacity = map.capacity();
        let total_area = self.light_area();
        let light_count = self.lights().len();
        let normal = config.emission_normal();

        log::info!("Emitting {} photons into the {} map", capacity, kind.name());

        let mut cumulative_area = 0.0;
        for (n, &light_index) in self.lights().iter().enumerate() {
            let Some(light) = self.objects().get(light_index) else {
                continue;
            };
            cumulative_area += light.surface_area();
            let quota = light_quota(capacity, cumulative_area, total_area, n, light_count);

            let origin = light.position();
            let power = light.material().emitted();
            let wanted = quota.saturating_sub(map.len());
            let max_emitted = wanted.saturating_mul(config.attempts_per_photon.max(1) as usize);

            let mut emitted = 0usize;
            while map.len() < quota && !map.is_full() {
                if emitted >= max_emitted {
                    log::warn!(
                        "Light {} exhausted its emission budget ({} photons) \
                         with {} of {} {} photons stored",
                        light_index,
                        max_emitted,
                        map.len(),
                        quota,
                        kind.name()
                    );
                    break;
                }
                emitted += 1;

                let direction = warp::cosine_hemisphere(normal, gen_f32(rng), gen_f32(rng));
                self.trace_photon(
                    map,
                    kind,
                    Ray::new(origin, direction),
                    power,
                    light_index,
                    config.max_bounces,
                    rng,
                );
            }

            log::debug!("Light {}: {} photons emitted, {} stored", light_index, emitted, map.len());
        }

        map.balance();
        if capacity > 0 {
            map.scale_power(config.power_scale / capacity as f32);
        }

        log::info!("{} map: {} photons stored", kind.name(), map.len());
    }

    /// Follow one photon path, storing at most one photon.
    fn trace_photon(
        &self,
        map: &mut PhotonMap,
        kind: MapKind,
        mut ray: Ray,
        mut power: Color,
        light_index: usize,
        max_bounces: u32,
        rng: &mut dyn RngCore,
    ) {
        // The photon starts inside its light
        let mut skip = Some(light_index);

        for bounce in 0..max_bounces {
            let Some((_, hit)) = self.intersect_skipping(&ray, skip.take()) else {
                return;
            };

            if kind == MapKind::Caustic && bounce == 0 && !hit.object.material().is_transparent() {
                return;
            }

            let p = ray.at(hit.t);
            let (normal, material) = hit.surface(p);
            let incident = ray.direction().normalize();

            let direction = match material {
                Material::Lambertian { albedo } => {
                    let rrp = (albedo.x + albedo.y + albedo.z) / 3.0;
                    if gen_f32(rng) < rrp {
                        power = *albedo * power / rrp;
                        scatter_lambertian(orient_normal(normal, incident), rng)
                    } else {
                        map.store(*albedo * power / (1.0 - rrp), p, incident);
                        return;
                    }
                }
                Material::Metal { albedo, roughness } => {
                    match scatter_metal(incident, normal, *roughness, rng) {
                        Some(direction) => {
                            power *= *albedo;
                            direction
                        }
                        None => return,
                    }
                }
                Material::Dielectric { ior } => {
                    let (direction, _) = scatter_dielectric(incident, normal, *ior, gen_f32(rng));
                    direction
                }
                Material::Emissive { .. } | Material::DebugNormal => return,
            };

            ray = Ray::new(p, direction);
        }
    }
}

/// Number of photons the map should hold once light `n` of `count` is done.
///
/// Shares are proportional to area and accumulate, so the last light always
/// targets the full capacity.
fn light_quota(
    capacity: usize,
    cumulative_area: f32,
    total_area: f32,
    n: usize,
    count: usize,
) -> usize {
    if n + 1 >= count {
        return capacity;
    }
    let share = if total_area > 0.0 {
        (cumulative_area / total_area) as f64
    } else {
        (n + 1) as f64 / count as f64
    };
    ((capacity as f64 * share).round() as usize).min(capacity)
}
