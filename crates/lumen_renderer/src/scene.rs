//! Scene: objects, derived light and transparent lists, camera, photon maps.

use crate::{Camera, Hit, HitableList, PhotonMap, RAY_EPSILON};
use lumen_math::{Interval, Ray, Vec3};

/// Default camera-ray recursion depth.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Everything a render needs to know about the world.
///
/// Geometry and camera are fixed at construction. The photon maps are
/// populated once by [`Scene::emit_photons`] and are read-only afterwards.
#[derive(Debug)]
pub struct Scene {
    objects: HitableList,
    lights: Vec<usize>,
    transparent: Vec<usize>,
    camera: Camera,
    max_depth: u32,
    pub(crate) global_map: Option<PhotonMap>,
    pub(crate) caustic_map: Option<PhotonMap>,
    pub(crate) photons_emitted: bool,
}

impl Scene {
    /// Build a scene, deriving the light list (emissive objects) and the
    /// transparent list (dielectric objects) from `objects`.
    pub fn new(objects: impl Into<HitableList>, camera: Camera) -> Self {
        let objects = objects.into();
        let mut lights = Vec::new();
        let mut transparent = Vec::new();

        for (index, object) in objects.iter().enumerate() {
            let material = object.material();
            if material.is_emissive() {
                lights.push(index);
            }
            if material.is_transparent() {
                transparent.push(index);
            }
        }

        log::debug!(
            "Scene: {} objects, {} lights, {} transparent",
            objects.len(),
            lights.len(),
            transparent.len()
        );

        Self {
            objects,
            lights,
            transparent,
            camera,
            max_depth: DEFAULT_MAX_DEPTH,
            global_map: None,
            caustic_map: None,
            photons_emitted: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Attach caller-allocated photon maps. Their capacities set the photon
    /// budget of each map.
    pub fn with_photon_maps(mut self, global: PhotonMap, caustic: PhotonMap) -> Self {
        self.global_map = Some(global);
        self.caustic_map = Some(caustic);
        self.photons_emitted = false;
        self
    }

    pub fn objects(&self) -> &HitableList {
        &self.objects
    }

    /// Indices of emissive objects.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    /// Indices of dielectric objects.
    pub fn transparent(&self) -> &[usize] {
        &self.transparent
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn global_map(&self) -> Option<&PhotonMap> {
        self.global_map.as_ref()
    }

    pub fn caustic_map(&self) -> Option<&PhotonMap> {
        self.caustic_map.as_ref()
    }

    /// True once the photon pass has run on the attached maps.
    pub fn photons_emitted(&self) -> bool {
        self.photons_emitted
    }

    /// Total surface area of all lights.
    pub fn light_area(&self) -> f32 {
        self.lights
            .iter()
            .filter_map(|&index| self.objects.get(index))
            .map(|light| light.surface_area())
            .sum()
    }

    /// Nearest surface along `ray`, ignoring hits closer than [`RAY_EPSILON`].
    pub fn intersect(&self, ray: &Ray) -> Option<(usize, Hit<'_>)> {
        self.intersect_skipping(ray, None)
    }

    pub(crate) fn intersect_skipping(
        &self,
        ray: &Ray,
        skip: Option<usize>,
    ) -> Option<(usize, Hit<'_>)> {
        self.objects
            .closest_hit(ray, Interval::new(RAY_EPSILON, f32::INFINITY), skip)
    }

    /// Whether a non-emissive object blocks the segment from `point` to `target`.
    pub fn occluded(&self, point: Vec3, target: Vec3) -> bool {
        let to_target = target - point;
        let distance = to_target.length();
        if distance <= RAY_EPSILON {
            return false;
        }

        let ray = Ray::new(point, to_target / distance);
        let ray_t = Interval::new(RAY_EPSILON, distance);
        self.objects
            .iter()
            .filter(|object| !object.material().is_emissive())
            .any(|object| object.hit(&ray, ray_t).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisBox, Color, Material, Sphere};
    use std::sync::Arc;

    fn test_scene() -> Scene {
        let diffuse = Arc::new(Material::lambertian(Color::splat(0.5)));
        let glass = Arc::new(Material::dielectric(1.5));
        let light = Arc::new(Material::emissive(Color::ONE, 2.0));

        let mut objects = HitableList::new();
        objects.add(Sphere::new(Vec3::ZERO, 1.0, diffuse));
        objects.add(Sphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5, glass));
        objects.add(AxisBox::new(
            Vec3::new(-1.0, 4.0, -1.0),
            Vec3::new(1.0, 4.5, 1.0),
            light,
        ));

        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 60.0, 1.0);
        Scene::new(objects, camera)
    }

    #[test]
    fn test_derived_lists() {
        let scene = test_scene();
        assert_eq!(scene.lights(), &[2]);
        assert_eq!(scene.transparent(), &[1]);
        assert_eq!(scene.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(!scene.photons_emitted());

        // 2 * (2*0.5 + 0.5*2 + 2*2)
        assert!((scene.light_area() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_intersect_closest() {
        let scene = test_scene();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let (index, hit) = scene.intersect(&ray).unwrap();
        assert_eq!(index, 0);
        assert!((hit.t - 4.0).abs() < 1e-4);

        let miss = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(scene.intersect(&miss).is_none());
    }

    #[test]
    fn test_occlusion_ignores_lights() {
        let scene = test_scene();

        // Straight up from the top of the sphere: only the light is in the way
        assert!(!scene.occluded(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 4.25, 0.0)));

        // From below the sphere the sphere itself blocks the light
        assert!(scene.occluded(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 4.25, 0.0)));
    }
}
