//! Surface materials and the scattering rules applied to them.
//!
//! Materials are plain data. The integrator and the photon tracer match on
//! the variant and call the helpers at the bottom of this file, so both
//! passes bend light the same way.

use crate::gen_f32;
use lumen_math::{optics, warp, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// How light interacts with a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Diffuse surface; lit by shadow rays and the photon maps.
    Lambertian { albedo: Color },
    /// Specular reflector. `roughness` in [0, 1] blurs the mirror direction.
    Metal { albedo: Color, roughness: f32 },
    /// Glass-like refractor with the given index of refraction.
    Dielectric { ior: f32 },
    /// Light source. Emits `color * intensity`.
    Emissive { color: Color, intensity: f32 },
    /// Shows the geometric normal as a color; not physically based.
    DebugNormal,
}

impl Material {
    /// Create a Lambertian material with the given albedo color.
    pub fn lambertian(albedo: Color) -> Self {
        Self::Lambertian { albedo }
    }

    /// Create a Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough
    pub fn metal(albedo: Color, roughness: f32) -> Self {
        Self::Metal {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Create a Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn dielectric(ior: f32) -> Self {
        Self::Dielectric { ior }
    }

    /// Create a light emitting `color * intensity`.
    pub fn emissive(color: Color, intensity: f32) -> Self {
        Self::Emissive { color, intensity }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Self::Emissive { .. })
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Dielectric { .. })
    }

    /// Light emitted by this material.
    pub fn emitted(&self) -> Color {
        match self {
            Self::Emissive { color, intensity } => *color * *intensity,
            _ => Color::ZERO,
        }
    }
}

/// Which way a dielectric sent the continuation ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    Reflected,
    Refracted,
}

// =============================================================================
// Scattering helpers
// =============================================================================

/// Flip `normal` so it faces against `incident`.
#[inline]
pub fn orient_normal(normal: Vec3, incident: Vec3) -> Vec3 {
    if normal.dot(incident) >= 0.0 {
        -normal
    } else {
        normal
    }
}

/// Lambertian bounce: cosine-weighted direction around `oriented_normal`.
pub fn scatter_lambertian(oriented_normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    warp::cosine_hemisphere(oriented_normal, gen_f32(rng), gen_f32(rng))
}

/// Metal bounce: mirror reflection of `incident` blurred by `roughness`.
///
/// `normal` is the outward geometric normal. The blur lobe sits on the side
/// the ray arrived from, but the result must leave through the outward
/// side; anything else, including every bounce off the inside of a closed
/// mirror, returns `None` and the path is absorbed.
pub fn scatter_metal(
    incident: Vec3,
    normal: Vec3,
    roughness: f32,
    rng: &mut dyn RngCore,
) -> Option<Vec3> {
    let oriented = orient_normal(normal, incident);
    let reflected = optics::reflect(incident, oriented);
    let fuzz = warp::cosine_hemisphere(oriented, gen_f32(rng), gen_f32(rng));
    let direction = reflected + roughness * fuzz;

    if direction.dot(normal) > 0.0 {
        Some(direction)
    } else {
        None
    }
}

/// Dielectric interface: refract or reflect, never both.
///
/// `incident` must be unit length and `normal` is the outward geometric
/// normal. `u` is a uniform draw in [0, 1) compared against Schlick's
/// reflectance. Total internal reflection always reflects.
pub fn scatter_dielectric(incident: Vec3, normal: Vec3, ior: f32, u: f32) -> (Vec3, Interface) {
    let entering = incident.dot(normal) < 0.0;
    let (oriented, ratio) = if entering {
        (normal, 1.0 / ior)
    } else {
        (-normal, ior)
    };

    let cos_theta = (-incident).dot(oriented).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let cannot_refract = ratio * sin_theta > 1.0;

    if cannot_refract || optics::schlick(cos_theta, ratio) > u {
        return (optics::reflect(incident, oriented), Interface::Reflected);
    }

    match optics::refract(incident, oriented, ratio) {
        Some(direction) => (direction, Interface::Refracted),
        None => (optics::reflect(incident, oriented), Interface::Reflected),
    }
}
