//! Direction sampling densities used for importance sampling.

use crate::{
    rng::{gen_f32, random_cosine_direction, random_unit_vector},
    Hittable,
};
use lux_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Orthonormal basis with `w` along a given direction.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Express a local-space vector in world space.
    #[inline]
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}

/// A probability density over directions.
///
/// `Hittable` borrows the light list and `Mixture` borrows its halves, so a
/// density lives only as long as the bounce that built it.
pub enum Pdf<'a> {
    /// Cosine-weighted hemisphere about the basis `w` axis.
    Cosine(Onb),
    /// Uniform over the whole sphere.
    Sphere,
    /// Directions towards `objects` as seen from `origin`.
    Hittable {
        objects: &'a dyn Hittable,
        origin: Vec3,
    },
    /// Equal-weight mixture of two densities.
    Mixture(&'a Pdf<'a>, &'a Pdf<'a>),
}

impl<'a> Pdf<'a> {
    pub fn cosine(normal: Vec3) -> Self {
        Pdf::Cosine(Onb::new(normal))
    }

    /// Density of sampling `direction`.
    pub fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        match self {
            Pdf::Cosine(uvw) => {
                let cosine_theta = direction.normalize().dot(uvw.w());
                (cosine_theta / PI).max(0.0)
            }
            Pdf::Sphere => 1.0 / (4.0 * PI),
            Pdf::Hittable { objects, origin } => objects.pdf_value(*origin, direction, rng),
            Pdf::Mixture(a, b) => 0.5 * a.value(direction, rng) + 0.5 * b.value(direction, rng),
        }
    }

    /// Draw a direction from this density.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine(uvw) => uvw.transform(random_cosine_direction(rng)),
            Pdf::Sphere => random_unit_vector(rng),
            Pdf::Hittable { objects, origin } => objects.random(*origin, rng),
            Pdf::Mixture(a, b) => {
                if gen_f32(rng) < 0.5 {
                    a.generate(rng)
                } else {
                    b.generate(rng)
                }
            }
        }
    }
}
