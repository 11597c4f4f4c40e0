//! Triangle primitive and indexed triangle meshes.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    bvh::BvhNode,
    error::{RenderError, RenderResult},
    hittable::{HitRecord, Hittable, MaterialId},
    rng::gen_f32,
    Object,
};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    area: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);

        Self {
            v0,
            v1,
            v2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox: Aabb::from_points(min, max),
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, _rng: &mut dyn RngCore) -> bool {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.u = u;
        rec.v = v;
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

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        if cosine < 1e-8 || self.area <= 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        // Uniform barycentric sample
        let s = gen_f32(rng).sqrt();
        let r2 = gen_f32(rng);
        let p = (1.0 - s) * self.v0 + s * (1.0 - r2) * self.v1 + s * r2 * self.v2;
        p - origin
    }
}

/// Indexed triangle mesh sharing one material, with its own BVH.
pub struct Mesh {
    triangles: Vec<Triangle>,
    bvh: BvhNode,
}

impl Mesh {
    /// Build a mesh from a vertex list and triangle indices (three per face).
    pub fn new(vertices: &[Vec3], indices: &[u32], material: MaterialId) -> RenderResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(RenderError::InvalidConfig(format!(
                "mesh index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for face in indices.chunks_exact(3) {
            let fetch = |i: u32| {
                vertices.get(i as usize).copied().ok_or_else(|| {
                    RenderError::InvalidConfig(format!(
                        "mesh index {} out of range for {} vertices",
                        i,
                        vertices.len()
                    ))
                })
            };
            triangles.push(Triangle::new(
                fetch(face[0])?,
                fetch(face[1])?,
                fetch(face[2])?,
                material,
            ));
        }

        let bvh = BvhNode::new(triangles.iter().cloned().map(Object::from).collect())?;
        log::debug!("Mesh: {} triangles, BVH depth {}", triangles.len(), bvh.depth());

        Ok(Self { triangles, bvh })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

impl Hittable for Mesh {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        self.bvh.hit(ray, ray_t, rec, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }
}
