//! Perlin gradient noise.

use crate::rng::gen_range;
use lux_math::Vec3;
use rand::RngCore;

pub const POINT_COUNT: usize = 256;

/// Gradient noise lattice: random unit gradients plus three permutation
/// tables.
#[derive(Debug, Clone)]
pub struct Perlin {
    ranvec: [Vec3; POINT_COUNT],
    perm_x: [u32; POINT_COUNT],
    perm_y: [u32; POINT_COUNT],
    perm_z: [u32; POINT_COUNT],
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut ranvec = [Vec3::ZERO; POINT_COUNT];
        for v in ranvec.iter_mut() {
            *v = loop {
                let candidate = Vec3::new(
                    gen_range(rng, -1.0, 1.0),
                    gen_range(rng, -1.0, 1.0),
                    gen_range(rng, -1.0, 1.0),
                );
                if candidate.length_squared() > 1e-6 {
                    break candidate.normalize();
                }
            };
        }

        Self {
            ranvec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    pub fn gradients(&self) -> &[Vec3; POINT_COUNT] {
        &self.ranvec
    }

    /// Permutation tables for x, y and z.
    pub fn permutations(&self) -> [&[u32; POINT_COUNT]; 3] {
        [&self.perm_x, &self.perm_y, &self.perm_z]
    }

    /// Smoothed noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let u = p.x - floor.x;
        let v = p.y - floor.y;
        let w = p.z - floor.z;

        let i = floor.x as i32;
        let j = floor.y as i32;
        let k = floor.z as i32;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *cell = self.ranvec[index as usize];
                }
            }
        }

        Self::perlin_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves of absolute noise.
    pub fn turb(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }

    fn generate_perm(rng: &mut dyn RngCore) -> [u32; POINT_COUNT] {
        let mut p = [0u32; POINT_COUNT];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u32;
        }

        for i in (1..POINT_COUNT).rev() {
            let target = (rng.next_u32() as usize) % (i + 1);
            p.swap(i, target);
        }

        p
    }

    fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
        // Hermite smoothing
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);

        let mut accum = 0.0;
        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, gradient) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                    let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * gradient.dot(weight_v);
                }
            }
        }

        accum
    }
}
