//! Lumen - CPU Photon Mapping
//!
//! A two-pass renderer: photons are traced from the lights into a global
//! and a caustics photon map, then camera rays are shaded with direct
//! lighting plus density estimates from both maps.

mod axis_box;
mod camera;
mod error;
mod frame;
mod hittable;
mod integrator;
mod material;
mod photon;
mod photon_map;
mod photon_pass;
mod renderer;
mod scanline;
mod scene;
mod sphere;

pub use axis_box::AxisBox;
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use frame::{FrameLayout, PAD_BYTE};
pub use hittable::{Hit, Hitable, HitableList};
pub use integrator::Integrator;
pub use material::{
    orient_normal, scatter_dielectric, scatter_lambertian, scatter_metal, Color, Interface,
    Material,
};
pub use photon::Photon;
pub use photon_map::{NearPhoton, PhotonMap, MIN_ESTIMATE_PHOTONS};
pub use renderer::{
    clamp_01, color_to_bgr, linear_to_gamma, render, render_frame, render_pixel, IndirectMode,
    PhotonConfig, RenderConfig, RenderStats,
};
pub use scanline::{render_rows, row_seed, RowAssembler, RowResult};
pub use scene::Scene;
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Offset applied along a ray before searching for the next surface.
pub const RAY_EPSILON: f32 = 0.001;

/// Uniform draw in [0, 1) from a type-erased generator.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
