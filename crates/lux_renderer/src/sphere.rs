//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable, MaterialId},
    pdf::Onb,
    rng::random_to_sphere,
};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive, optionally moving linearly over the shutter interval.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center at time 0
    center: Vec3,
    /// Displacement from time 0 to time 1 (zero for static spheres)
    motion: Vec3,
    radius: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new static sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self::moving(center, center, radius, material)
    }

    /// Create a sphere whose center moves from `center0` at t=0 to `center1` at t=1.
    pub fn moving(center0: Vec3, center1: Vec3, radius: f32, material: MaterialId) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: center0,
            motion: center1 - center0,
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    /// Center of the sphere at the given time.
    #[inline]
    pub fn center(&self, time: f32) -> Vec3 {
        self.center + time * self.motion
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn is_moving(&self) -> bool {
        self.motion != Vec3::ZERO
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, _rng: &mut dyn RngCore) -> bool {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        let mut rec = HitRecord::default();
        let ray = Ray::new(origin, direction, 0.0);
        if !self.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
            return 0.0;
        }

        let dist_squared = (self.center(0.0) - origin).length_squared();
        let r2 = self.radius * self.radius;
        if dist_squared <= r2 {
            return 1.0 / (4.0 * PI);
        }

        let cos_theta_max = (1.0 - r2 / dist_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        if solid_angle <= 0.0 {
            return 0.0;
        }

        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center(0.0) - origin;
        let distance_squared = direction.length_squared();
        let r2 = self.radius * self.radius;
        if distance_squared <= r2 {
            return crate::rng::random_unit_vector(rng);
        }

        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(rng, self.radius, distance_squared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MaterialId(3));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);
        assert_eq!(rec.material, MaterialId(3));
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        assert!(!sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_hit_from_inside_is_back_face() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, MaterialId(0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(!rec.front_face);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_moving_sphere_bbox_covers_both_ends() {
        let sphere = Sphere::moving(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 0.5, MaterialId(0));
        let bbox = sphere.bounding_box();

        assert_eq!(bbox.y.min, -0.5);
        assert_eq!(bbox.y.max, 2.5);
        assert!(sphere.is_moving());

        // The hit position follows the ray time
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        let early = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!sphere.hit(&early, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_light_sampling_matches_solid_angle() {
        let sphere = Sphere::new(Vec3::new(0.0, 4.0, 0.0), 1.0, MaterialId::NONE);
        let mut rng = StdRng::seed_from_u64(9);

        let cos_theta_max = (1.0_f32 - 1.0 / 16.0).sqrt();
        let expected = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));

        for _ in 0..50 {
            let dir = sphere.random(Vec3::ZERO, &mut rng);
            let pdf = sphere.pdf_value(Vec3::ZERO, dir, &mut rng);
            assert!((pdf - expected).abs() / expected < 1e-3);
        }

        // Directions missing the sphere have zero density
        assert_eq!(sphere.pdf_value(Vec3::ZERO, -Vec3::Y, &mut rng), 0.0);
    }
}
