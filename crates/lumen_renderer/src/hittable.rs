//! Scene geometry as a closed set of primitives, plus the linear-scan list
//! used for intersection queries.

use crate::{AxisBox, Material, Sphere};
use lumen_math::{Interval, Ray, Vec3};

/// Any object that can be placed in a scene.
#[derive(Debug, Clone)]
pub enum Hitable {
    Sphere(Sphere),
    Aabb(AxisBox),
}

impl From<Sphere> for Hitable {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<AxisBox> for Hitable {
    fn from(block: AxisBox) -> Self {
        Self::Aabb(block)
    }
}

/// Result of a successful intersection test.
///
/// Holds the ray parameter and the object that was hit; the surface normal
/// is computed later, only for the hit that survives the closest-hit search.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub t: f32,
    pub object: &'a Hitable,
}

impl<'a> Hit<'a> {
    /// Outward normal and material at a point on the hit object.
    pub fn surface(&self, p: Vec3) -> (Vec3, &'a Material) {
        self.object.surface(p)
    }
}

impl Hitable {
    /// Test if a ray hits this object strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let t = match self {
            Self::Sphere(sphere) => sphere.hit(ray, ray_t),
            Self::Aabb(block) => block.hit(ray, ray_t),
        }?;
        Some(Hit { t, object: self })
    }

    /// Outward normal and material at a surface point.
    pub fn surface(&self, p: Vec3) -> (Vec3, &Material) {
        match self {
            Self::Sphere(sphere) => (sphere.normal_at(p), sphere.material()),
            Self::Aabb(block) => (block.normal_at(p), block.material()),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Self::Sphere(sphere) => sphere.material(),
            Self::Aabb(block) => block.material(),
        }
    }

    /// Representative point, used as the sample position for lights.
    pub fn position(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center(),
            Self::Aabb(block) => block.center(),
        }
    }

    pub fn surface_area(&self) -> f32 {
        match self {
            Self::Sphere(sphere) => sphere.surface_area(),
            Self::Aabb(block) => block.surface_area(),
        }
    }
}

/// A list of hitable objects, searched linearly.
#[derive(Debug, Clone, Default)]
pub struct HitableList {
    objects: Vec<Hitable>,
}

impl HitableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Hitable>) {
        self.objects.push(object.into());
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Hitable> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hitable> {
        self.objects.iter()
    }

    /// Closest hit inside `ray_t`, with the index of the object hit.
    ///
    /// `skip` excludes one object, e.g. the light a photon leaves from.
    pub fn closest_hit(
        &self,
        ray: &Ray,
        ray_t: Interval,
        skip: Option<usize>,
    ) -> Option<(usize, Hit<'_>)> {
        let mut closest: Option<(usize, Hit<'_>)> = None;
        let mut closest_so_far = ray_t.max;

        for (index, object) in self.objects.iter().enumerate() {
            if skip == Some(index) {
                continue;
            }
            if let Some(hit) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = hit.t;
                closest = Some((index, hit));
            }
        }

        closest
    }
}

impl From<Vec<Hitable>> for HitableList {
    fn from(objects: Vec<Hitable>) -> Self {
        Self { objects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use std::sync::Arc;

    fn two_spheres() -> HitableList {
        let mat = Arc::new(Material::lambertian(Color::ONE));
        let mut list = HitableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, mat.clone()));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, mat));
        list
    }

    #[test]
    fn test_closest_hit_picks_nearest() {
        let list = two_spheres();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let ray_t = Interval::new(0.001, f32::INFINITY);
        let (index, hit) = list.closest_hit(&ray, ray_t, None).unwrap();
        assert_eq!(index, 1);
        assert!((hit.t - 1.5).abs() < 1e-5);

        let (normal, _) = hit.surface(ray.at(hit.t));
        assert!((normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_closest_hit_skip() {
        let list = two_spheres();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let ray_t = Interval::new(0.001, f32::INFINITY);
        let (index, hit) = list.closest_hit(&ray, ray_t, Some(1)).unwrap();
        assert_eq!(index, 0);
        assert!((hit.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_closest_hit_miss() {
        let list = two_spheres();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(list.closest_hit(&ray, Interval::new(0.001, f32::INFINITY), None).is_none());
    }

    #[test]
    fn test_hitable_accessors() {
        let light = Arc::new(Material::emissive(Color::ONE, 2.0));
        let block: Hitable = AxisBox::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 2.0), light).into();

        assert!(block.material().is_emissive());
        assert_eq!(block.position(), Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(block.surface_area(), 2.0 * (2.0 + 2.0 + 4.0));
    }
}
