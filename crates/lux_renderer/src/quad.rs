//! Planar quadrilaterals and the six-sided box built from them.

use crate::{
    hittable::{HitRecord, Hittable, HittableList, MaterialId},
    rng::gen_f32,
};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A parallelogram spanned by `u` and `v` from corner `q`.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// n / (n . n), maps a planar hit point to (alpha, beta)
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: MaterialId) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        let bbox_diagonal1 = Aabb::from_points(q, q + u + v);
        let bbox_diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area: n.length(),
            material,
            bbox: Aabb::surrounding(&bbox_diagonal1, &bbox_diagonal2),
        }
    }

    pub fn corner(&self) -> Vec3 {
        self.q
    }

    pub fn edges(&self) -> (Vec3, Vec3) {
        (self.u, self.v)
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, _rng: &mut dyn RngCore) -> bool {
        let denom = self.normal.dot(ray.direction());

        // Ray is parallel to the plane
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        let intersection = ray.at(t);
        let planar_hitpt = intersection - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return false;
        }

        rec.t = t;
        rec.p = intersection;
        rec.u = alpha;
        rec.v = beta;
        rec.material = self.material;
        rec.set_face_normal(ray, self.normal);

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

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        if cosine < 1e-8 || self.area <= 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

/// Axis-aligned box made of six outward-facing quads.
#[derive(Clone)]
pub struct BoxShape {
    min: Vec3,
    max: Vec3,
    material: MaterialId,
    sides: HittableList,
}

impl BoxShape {
    /// Box spanning the two opposite corners `a` and `b`.
    pub fn new(a: Vec3, b: Vec3, material: MaterialId) -> Self {
        let min = a.min(b);
        let max = a.max(b);

        let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, max.y - min.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, max.z - min.z);

        let mut sides = HittableList::new();
        sides.add(Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material)); // front
        sides.add(Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material)); // right
        sides.add(Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material)); // back
        sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material)); // left
        sides.add(Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material)); // top
        sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material)); // bottom

        Self {
            min,
            max,
            material,
            sides,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// The six faces.
    pub fn sides(&self) -> &HittableList {
        &self.sides
    }
}

impl Hittable for BoxShape {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        self.sides.hit(ray, ray_t, rec, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.sides.bounding_box()
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.sides.pdf_value(origin, direction, rng)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.sides.random(origin, rng)
    }
}

/// Convenience constructor for a box spanning `a` and `b`.
pub fn make_box(a: Vec3, b: Vec3, material: MaterialId) -> BoxShape {
    BoxShape::new(a, b, material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn floor() -> Quad {
        Quad::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
            MaterialId(0),
        )
    }

    #[test]
    fn test_quad_hit_inside() {
        let quad = floor();
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);

        assert!(quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.u - 0.5).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
        assert!(rec.normal.y > 0.0);
    }

    #[test]
    fn test_quad_miss_outside_and_parallel() {
        let quad = floor();
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        let outside = Ray::new(Vec3::new(3.0, 1.0, 0.0), -Vec3::Y, 0.0);
        assert!(!quad.hit(&outside, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 0.0);
        assert!(!quad.hit(&parallel, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_quad_bbox_is_padded() {
        let bbox = floor().bounding_box();
        assert!(bbox.y.size() > 0.0);
        assert_eq!(bbox.x.min, -1.0);
        assert_eq!(bbox.z.max, 1.0);
    }

    #[test]
    fn test_quad_pdf_matches_area_formula() {
        // 2x2 light one unit above the origin, sampled straight down the normal
        let light = Quad::new(
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            MaterialId::NONE,
        );
        let mut rng = StdRng::seed_from_u64(0);

        let pdf = light.pdf_value(Vec3::ZERO, Vec3::Y, &mut rng);
        assert!((pdf - 0.25).abs() < 1e-5);

        for _ in 0..20 {
            let dir = light.random(Vec3::ZERO, &mut rng);
            assert!((dir.y - 1.0).abs() < 1e-5);
            assert!(light.pdf_value(Vec3::ZERO, dir, &mut rng) > 0.0);
        }
    }

    #[test]
    fn test_box_faces_point_outward() {
        let b = make_box(Vec3::ZERO, Vec3::ONE, MaterialId(0));
        assert_eq!(b.sides().len(), 6);

        let mut rng = StdRng::seed_from_u64(0);
        let probes = [
            (Vec3::new(0.5, 0.5, 5.0), -Vec3::Z),
            (Vec3::new(0.5, 0.5, -5.0), Vec3::Z),
            (Vec3::new(5.0, 0.5, 0.5), -Vec3::X),
            (Vec3::new(-5.0, 0.5, 0.5), Vec3::X),
            (Vec3::new(0.5, 5.0, 0.5), -Vec3::Y),
            (Vec3::new(0.5, -5.0, 0.5), Vec3::Y),
        ];
        for (origin, dir) in probes {
            let mut rec = HitRecord::default();
            let ray = Ray::new(origin, dir, 0.0);
            assert!(b.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
            assert!(rec.front_face, "face hit from {origin:?} should be a front face");
            assert!((rec.t - 4.0).abs() < 1e-4);
        }

        let bbox = b.bounding_box();
        assert!(bbox.contains(&Aabb::from_points(Vec3::ZERO, Vec3::ONE)));
    }
}
