//! The closed set of scene-graph nodes.
//!
//! Each variant has a stable integer tag used when the scene is flattened
//! for the GPU backend.

use std::sync::Arc;

use crate::{
    BoxShape, BvhNode, ConstantMedium, HitRecord, Hittable, HittableList, Mesh, Quad, RotateY,
    Sphere, Translate, Triangle,
};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Any object that can be placed in a scene.
///
/// Heavy or recursive variants are reference counted so cloning an
/// `Object` (to reuse it as a light, or in several lists) stays cheap.
#[derive(Clone)]
pub enum Object {
    Sphere(Sphere),
    Quad(Quad),
    Triangle(Triangle),
    Box(Arc<BoxShape>),
    Mesh(Arc<Mesh>),
    Medium(Arc<ConstantMedium>),
    Translate(Arc<Translate>),
    RotateY(Arc<RotateY>),
    List(Arc<HittableList>),
    Bvh(Arc<BvhNode>),
}

impl Object {
    /// Stable tag for this variant.
    pub fn tag(&self) -> u32 {
        match self {
            Object::Sphere(_) => 0,
            Object::Quad(_) => 1,
            Object::Box(_) => 2,
            Object::Medium(_) => 3,
            Object::Triangle(_) => 4,
            Object::Mesh(_) => 5,
            Object::Translate(_) => 6,
            Object::RotateY(_) => 7,
            Object::List(_) => 8,
            Object::Bvh(_) => 9,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Object::Sphere($inner) => $body,
            Object::Quad($inner) => $body,
            Object::Triangle($inner) => $body,
            Object::Box($inner) => $body,
            Object::Mesh($inner) => $body,
            Object::Medium($inner) => $body,
            Object::Translate($inner) => $body,
            Object::RotateY($inner) => $body,
            Object::List($inner) => $body,
            Object::Bvh($inner) => $body,
        }
    };
}

impl Hittable for Object {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        delegate!(self, o => o.hit(ray, ray_t, rec, rng))
    }

    fn bounding_box(&self) -> Aabb {
        delegate!(self, o => o.bounding_box())
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        delegate!(self, o => o.pdf_value(origin, direction, rng))
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        delegate!(self, o => o.random(origin, rng))
    }
}

impl From<Sphere> for Object {
    fn from(s: Sphere) -> Self {
        Object::Sphere(s)
    }
}

impl From<Quad> for Object {
    fn from(q: Quad) -> Self {
        Object::Quad(q)
    }
}

impl From<Triangle> for Object {
    fn from(t: Triangle) -> Self {
        Object::Triangle(t)
    }
}

impl From<BoxShape> for Object {
    fn from(b: BoxShape) -> Self {
        Object::Box(Arc::new(b))
    }
}

impl From<Mesh> for Object {
    fn from(m: Mesh) -> Self {
        Object::Mesh(Arc::new(m))
    }
}

impl From<ConstantMedium> for Object {
    fn from(m: ConstantMedium) -> Self {
        Object::Medium(Arc::new(m))
    }
}

impl From<Translate> for Object {
    fn from(t: Translate) -> Self {
        Object::Translate(Arc::new(t))
    }
}

impl From<RotateY> for Object {
    fn from(r: RotateY) -> Self {
        Object::RotateY(Arc::new(r))
    }
}

impl From<HittableList> for Object {
    fn from(l: HittableList) -> Self {
        Object::List(Arc::new(l))
    }
}

impl From<BvhNode> for Object {
    fn from(b: BvhNode) -> Self {
        Object::Bvh(Arc::new(b))
    }
}
