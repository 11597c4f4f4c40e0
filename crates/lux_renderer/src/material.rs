//! Materials describe how light interacts with surfaces.

use crate::{
    hittable::HitRecord,
    pdf::Pdf,
    rng::{gen_f32, random_in_unit_sphere},
    texture::Texture,
};
use lux_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// How a scattered path continues.
pub enum ScatterKind {
    /// A single deterministic continuation (mirror, glass).
    Specular(Ray),
    /// Continue by sampling a direction density.
    Diffuse(Pdf<'static>),
}

/// Result of a successful scatter.
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

/// Surface or phase material, referenced from geometry by `MaterialId`.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian { albedo: Texture },
    /// `fuzz` is clamped to [0, 1]; 0 is a perfect mirror.
    Metal { albedo: Color, fuzz: f32 },
    /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    Dielectric { ior: f32 },
    DiffuseLight { emit: Texture },
    /// Phase function for participating media.
    Isotropic { albedo: Texture },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    pub fn diffuse_light(emit: impl Into<Texture>) -> Self {
        Material::DiffuseLight { emit: emit.into() }
    }

    pub fn isotropic(albedo: impl Into<Texture>) -> Self {
        Material::Isotropic {
            albedo: albedo.into(),
        }
    }

    /// Stable tag shared with the GPU material table.
    pub fn tag(&self) -> u32 {
        match self {
            Material::Lambertian { .. } => 0,
            Material::Metal { .. } => 1,
            Material::Dielectric { .. } => 2,
            Material::DiffuseLight { .. } => 3,
            Material::Isotropic { .. } => 4,
        }
    }

    /// Scatter an incoming ray, or return None if it is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        match self {
            Material::Lambertian { albedo } => Some(ScatterRecord {
                attenuation: albedo.value(rec.u, rec.v, rec.p),
                kind: ScatterKind::Diffuse(Pdf::cosine(rec.normal)),
            }),

            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = reflected + *fuzz * random_in_unit_sphere(rng);

                // Fuzzed reflections that end up below the surface are absorbed
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(ScatterRecord {
                    attenuation: *albedo,
                    kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time())),
                })
            }

            Material::Dielectric { ior } => {
                let refraction_ratio = if rec.front_face { 1.0 / ior } else { *ior };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                let cannot_refract = refraction_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
                {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, refraction_ratio)
                };

                Some(ScatterRecord {
                    attenuation: Color::ONE,
                    kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time())),
                })
            }

            Material::DiffuseLight { .. } => None,

            Material::Isotropic { albedo } => Some(ScatterRecord {
                attenuation: albedo.value(rec.u, rec.v, rec.p),
                kind: ScatterKind::Diffuse(Pdf::Sphere),
            }),
        }
    }

    /// Emitted radiance. Lights only emit from their front face.
    pub fn emitted(&self, _ray_in: &Ray, rec: &HitRecord, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight { emit } if rec.front_face => emit.value(u, v, p),
            _ => Color::ZERO,
        }
    }

    /// Density with which this material scatters into `scattered`.
    pub fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        match self {
            Material::Lambertian { .. } => {
                let cos_theta = rec.normal.dot(scattered.direction().normalize());
                if cos_theta < 0.0 {
                    0.0
                } else {
                    cos_theta / PI
                }
            }
            Material::Isotropic { .. } => 1.0 / (4.0 * PI),
            _ => 0.0,
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance. Index-matched boundaries
/// (ratio 1) never reflect.
fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    if (refraction_ratio - 1.0).abs() < 1e-6 {
        return 0.0;
    }
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
