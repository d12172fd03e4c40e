//! Warps from the unit square to directions.

use crate::{Frame, Vec3};
use std::f32::consts::PI;

/// Cosine-weighted direction in the local hemisphere around +Z.
///
/// `(cos φ·r, sin φ·r, √(1−u1))` with `r = √u1` and `φ = 2π·u2`.
pub fn cosine_hemisphere_local(u1: f32, u2: f32) -> Vec3 {
    let phi = 2.0 * PI * u2;
    let r = u1.sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(cos_phi * r, sin_phi * r, (1.0 - u1).max(0.0).sqrt())
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// `normal` must be unit length. Returns `normal` itself if the warped
/// vector degenerates numerically.
pub fn cosine_hemisphere(normal: Vec3, u1: f32, u2: f32) -> Vec3 {
    let local = cosine_hemisphere_local(u1, u2);
    let dir = Frame::from_w(normal).from_local(local);
    if near_zero(dir) {
        normal
    } else {
        dir.normalize()
    }
}

/// True if every component is within 1e-8 of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    let s = 1e-8;
    v.x.abs() < s && v.y.abs() < s && v.z.abs() < s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_hemisphere_stays_above_surface() {
        let n = Vec3::new(0.0, -1.0, 0.0);
        let mut u = 0.013_f32;
        for i in 0..64 {
            let v = (i as f32 + 0.5) / 64.0;
            let d = cosine_hemisphere(n, u, v);
            assert!(d.dot(n) >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
            u = (u + 0.618_034) % 1.0;
        }
    }

    #[test]
    fn test_cosine_hemisphere_pole() {
        // u1 = 0 maps to the pole, i.e. the normal itself
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let d = cosine_hemisphere(n, 0.0, 0.3);
        assert!((d - n).length() < 1e-5);
    }

    #[test]
    fn test_near_zero() {
        assert!(near_zero(Vec3::splat(1e-9)));
        assert!(!near_zero(Vec3::new(0.0, 1e-3, 0.0)));
    }
}
