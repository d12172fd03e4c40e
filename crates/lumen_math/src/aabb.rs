use crate::{Interval, Ray, Vec3};

/// Axis-aligned box given by its two extreme corners.
///
/// Used directly as scene geometry (walls, blocks, area lights), so besides the
/// slab test it knows its face normals and surface area.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Tolerance used to decide which face a surface point lies on.
    pub const FACE_EPSILON: f32 = 1e-4;

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Parameter range over which the ray is inside all three slabs.
    ///
    /// The range is empty when the ray misses the box. A ray parallel to a
    /// pair of faces only passes when its origin lies strictly between them;
    /// one running along a face plane misses.
    pub fn slab_range(&self, r: &Ray) -> Interval {
        let mut range = Interval::UNIVERSE;

        for axis in 0..3 {
            if r.direction[axis] == 0.0 {
                if self.axis_interval(axis).surrounds(r.origin[axis]) {
                    continue;
                }
                return Interval::EMPTY;
            }
            let t0 = (self.min[axis] - r.origin[axis]) / r.direction[axis];
            let t1 = (self.max[axis] - r.origin[axis]) / r.direction[axis];
            range = range.intersect(&Interval::new(t0.min(t1), t0.max(t1)));
        }

        range
    }

    /// Nearest ray parameter strictly inside `ray_t` at which the ray crosses
    /// the box surface.
    ///
    /// Tries the entry point first, then the exit point (ray starting inside).
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> Option<f32> {
        let range = self.slab_range(r);
        if range.is_empty() || range.intersect(&ray_t).is_empty() {
            return None;
        }

        if ray_t.surrounds(range.min) {
            Some(range.min)
        } else if ray_t.surrounds(range.max) {
            Some(range.max)
        } else {
            None
        }
    }

    /// Outward normal of the face containing `p`.
    ///
    /// Faces are tested in a fixed order: left, right, bottom, top, back,
    /// front. A point on an edge gets the first matching face.
    pub fn face_normal(&self, p: Vec3) -> Vec3 {
        let eps = Self::FACE_EPSILON;
        if p.x < self.min.x + eps {
            Vec3::NEG_X
        } else if p.x > self.max.x - eps {
            Vec3::X
        } else if p.y < self.min.y + eps {
            Vec3::NEG_Y
        } else if p.y > self.max.y - eps {
            Vec3::Y
        } else if p.z < self.min.z + eps {
            Vec3::NEG_Z
        } else if p.z > self.max.z - eps {
            Vec3::Z
        } else {
            self.closest_face_normal(p)
        }
    }

    /// Normal of the face nearest to `p`, for points off the surface.
    fn closest_face_normal(&self, p: Vec3) -> Vec3 {
        let mut best = Vec3::NEG_X;
        let mut best_dist = f32::INFINITY;

        for axis in 0..3 {
            let mut normal = Vec3::ZERO;
            let to_min = p[axis] - self.min[axis];
            let to_max = self.max[axis] - p[axis];
            if to_min < best_dist {
                normal[axis] = -1.0;
                best = normal;
                best_dist = to_min;
            }
            if to_max < best_dist {
                normal[axis] = 1.0;
                best = normal;
                best_dist = to_max;
            }
        }

        best
    }

    /// Total area of the six faces.
    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 10.0, 5.0));
        assert_eq!(aabb.axis_interval(2), Interval::new(0.0, 5.0));
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = unit_box();
        let t = Interval::new(0.001, 100.0);

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = aabb.hit(&ray, t).expect("ray aimed at box should hit");
        assert!((hit - 4.0).abs() < 1e-5);

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.hit(&ray, t).is_none());
    }

    #[test]
    fn test_aabb_parallel_outside_slab_never_hits() {
        let aabb = unit_box();
        let t = Interval::new(0.001, f32::INFINITY);

        // Parallel to the x faces and outside the x slab, for several y/z offsets.
        for (y, z) in [(0.0, -5.0), (0.5, -5.0), (-0.9, -3.0)] {
            let ray = Ray::new(Vec3::new(3.0, y, z), Vec3::new(0.0, 0.0, 1.0));
            assert!(aabb.hit(&ray, t).is_none());
        }

        // Negative zero direction component behaves the same
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::new(-0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, t).is_none());
    }

    #[test]
    fn test_aabb_ray_along_face_plane_misses() {
        let aabb = unit_box();
        let t = Interval::new(0.001, f32::INFINITY);

        // Origin exactly on the y = 1 plane, travelling within it toward the box
        let ray = Ray::new(Vec3::new(0.0, 1.0, -5.0), Vec3::Z);
        assert!(aabb.slab_range(&ray).is_empty());
        assert!(aabb.hit(&ray, t).is_none());

        // Same on the min side, with a negative zero component
        let ray = Ray::new(Vec3::new(-1.0, 0.0, -5.0), Vec3::new(-0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, t).is_none());

        // Just inside the slab still hits the front face
        let ray = Ray::new(Vec3::new(0.0, 0.999, -5.0), Vec3::Z);
        let hit = aabb.hit(&ray, t).unwrap();
        assert!((hit - 4.0).abs() < 1e-5);
        assert_eq!(aabb.slab_range(&ray), Interval::new(4.0, 6.0));
    }

    #[test]
    fn test_aabb_hit_from_inside_returns_exit() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));

        let hit = aabb.hit(&ray, Interval::new(0.001, 100.0)).unwrap();
        assert!((hit - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_hit_respects_interval() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        // Box lies entirely beyond t_max
        assert!(aabb.hit(&ray, Interval::new(0.001, 3.0)).is_none());
    }

    #[test]
    fn test_aabb_face_normal() {
        let aabb = unit_box();

        assert_eq!(aabb.face_normal(Vec3::new(-1.0, 0.2, 0.3)), Vec3::NEG_X);
        assert_eq!(aabb.face_normal(Vec3::new(0.1, 1.0, 0.3)), Vec3::Y);
        assert_eq!(aabb.face_normal(Vec3::new(0.1, 0.2, 1.0)), Vec3::Z);

        // Edge point: left face wins over bottom face
        assert_eq!(aabb.face_normal(Vec3::new(-1.0, -1.0, 0.0)), Vec3::NEG_X);
    }

    #[test]
    fn test_aabb_area_and_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 3.0, 4.0));

        assert_eq!(aabb.surface_area(), 2.0 * (6.0 + 12.0 + 8.0));
        assert_eq!(aabb.centroid(), Vec3::new(1.0, 1.5, 2.0));
    }
}
