//! Homogeneous participating media (smoke, fog).

use crate::{
    hittable::{HitRecord, Hittable, MaterialId},
    rng::gen_f32,
    Object,
};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A volume of constant density bounded by a closed surface.
///
/// Rays entering the boundary scatter at an exponentially distributed
/// distance; the phase material is normally `Material::Isotropic`.
pub struct ConstantMedium {
    boundary: Object,
    density: f32,
    neg_inv_density: f32,
    phase_function: MaterialId,
}

impl ConstantMedium {
    pub fn new(boundary: impl Into<Object>, density: f32, phase_function: MaterialId) -> Self {
        if density <= 0.0 {
            log::warn!("ConstantMedium density {density} is not positive; medium will be invisible");
        }

        Self {
            boundary: boundary.into(),
            density,
            neg_inv_density: -1.0 / density,
            phase_function,
        }
    }

    pub fn boundary(&self) -> &Object {
        &self.boundary
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn phase_function(&self) -> MaterialId {
        self.phase_function
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        if self.density <= 0.0 {
            return false;
        }

        let mut rec1 = HitRecord::default();
        let mut rec2 = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut rec1, rng) {
            return false;
        }
        if !self
            .boundary
            .hit(ray, Interval::new(rec1.t + 0.0001, f32::INFINITY), &mut rec2, rng)
        {
            return false;
        }

        let t_enter = rec1.t.max(ray_t.min).max(0.0);
        let t_exit = rec2.t.min(ray_t.max);
        if t_enter >= t_exit {
            return false;
        }

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - u keeps the argument of ln in (0, 1]
        let hit_distance = self.neg_inv_density * (1.0 - gen_f32(rng)).ln();

        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t_enter + hit_distance / ray_length;
        rec.p = ray.at(rec.t);
        rec.normal = Vec3::X; // arbitrary
        rec.front_face = true; // also arbitrary
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.phase_function;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
