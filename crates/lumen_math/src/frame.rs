use crate::Vec3;

/// Orthonormal basis with `w` along a given direction.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Frame {
    /// Build a frame around a unit vector `w`.
    ///
    /// The helper axis is X unless `w` has a significant X component, in
    /// which case Y is used, keeping the cross product well conditioned.
    pub fn from_w(w: Vec3) -> Self {
        let helper = if w.x.abs() > 0.1 { Vec3::Y } else { Vec3::X };
        let u = helper.cross(w).normalize();
        let v = w.cross(u);
        Self { u, v, w }
    }

    /// Transform local coordinates (x along u, y along v, z along w) to world.
    #[inline]
    pub fn from_local(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_orthonormal() {
        for w in [Vec3::Y, Vec3::NEG_Y, Vec3::X, Vec3::new(1.0, 2.0, -3.0).normalize()] {
            let f = Frame::from_w(w);
            assert!((f.u.length() - 1.0).abs() < 1e-5);
            assert!((f.v.length() - 1.0).abs() < 1e-5);
            assert!(f.u.dot(f.v).abs() < 1e-5);
            assert!(f.u.dot(f.w).abs() < 1e-5);
            assert!(f.v.dot(f.w).abs() < 1e-5);
        }
    }

    #[test]
    fn test_frame_from_local_maps_axes() {
        let f = Frame::from_w(Vec3::new(0.3, -0.4, 0.5).normalize());
        assert!((f.from_local(Vec3::Z) - f.w).length() < 1e-6);
        assert!((f.from_local(Vec3::X) - f.u).length() < 1e-6);

        // Lengths are preserved
        let local = Vec3::new(0.7, -1.2, 2.0);
        assert!((f.from_local(local).length() - local.length()).abs() < 1e-5);
    }
}
