//! Instance transforms: translation and rotation about +Y.
//!
//! Rays are moved into object space, the wrapped object is hit there, and the
//! hit point and normal are moved back out.

use crate::{
    hittable::{HitRecord, Hittable},
    Object,
};
use lux_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};
use rand::RngCore;

/// An object displaced by a fixed offset.
pub struct Translate {
    object: Object,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: impl Into<Object>, offset: Vec3) -> Self {
        let object = object.into();
        let bbox = object.bounding_box().translate(offset);
        Self {
            object,
            offset,
            bbox,
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        let offset_r = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        if !self.object.hit(&offset_r, ray_t, rec, rng) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.object.pdf_value(origin - self.offset, direction, rng)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// An object rotated about the +Y axis.
pub struct RotateY {
    object: Object,
    degrees: f32,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Aabb,
}

impl RotateY {
    pub fn new(object: impl Into<Object>, degrees: f32) -> Self {
        let object = object.into();
        let radians = degrees.to_radians();
        let bbox = Mat4::from_rotation_y(radians).transform_aabb(&object.bounding_box());

        Self {
            object,
            degrees,
            sin_theta: radians.sin(),
            cos_theta: radians.cos(),
            bbox,
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    /// World space to object space.
    #[inline]
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object space to world space.
    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        let rotated_r = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.time(),
        );

        if !self.object.hit(&rotated_r, ray_t, rec, rng) {
            return false;
        }

        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.object
            .pdf_value(self.to_object(origin), self.to_object(direction), rng)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.to_world(self.object.random(self.to_object(origin), rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_box, MaterialId, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_translate_moves_hit_point() {
        let moved = Translate::new(Sphere::new(Vec3::ZERO, 1.0, MaterialId(0)), Vec3::new(10.0, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(10.0, 0.0, 5.0), -Vec3::Z, 0.0);

        assert!(moved.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.p - Vec3::new(10.0, 0.0, 1.0)).length() < 1e-4);
        assert_eq!(moved.bounding_box().x.min, 9.0);
    }

    #[test]
    fn test_rotate_y_matches_mat4_convention() {
        // The glam rotation and the hand-written to_world agree
        let rot = RotateY::new(Sphere::new(Vec3::ZERO, 1.0, MaterialId(0)), 30.0);
        let m = Mat4::from_rotation_y(30.0_f32.to_radians());
        let p = Vec3::new(1.0, 2.0, 3.0);

        assert!((rot.to_world(p) - m.transform_point3(p)).length() < 1e-5);
        assert!((rot.to_object(rot.to_world(p)) - p).length() < 1e-5);
    }

    #[test]
    fn test_rotated_box_hit_and_normal() {
        // Box turned 90 degrees: its +X face now faces -Z
        let rotated = RotateY::new(make_box(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0), MaterialId(0)), 90.0);
        let bbox = rotated.bounding_box();
        assert!((bbox.z.min + 2.0).abs() < 1e-3);
        assert!((bbox.x.max - 1.0).abs() < 1e-3);

        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.5, 0.5, -10.0), Vec3::Z, 0.0);
        assert!(rotated.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.p.z + 2.0).abs() < 1e-3);
        assert!((rec.normal - -Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_transformed_light_sampling() {
        let light = Translate::new(Sphere::new(Vec3::ZERO, 1.0, MaterialId::NONE), Vec3::new(0.0, 5.0, 0.0));
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..10 {
            let dir = light.random(Vec3::ZERO, &mut rng);
            assert!(dir.y > 0.0);
            assert!(light.pdf_value(Vec3::ZERO, dir, &mut rng) > 0.0);
        }
    }
}
