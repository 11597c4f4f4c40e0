//! Textures: spatially varying colors looked up by (u, v, p).

use std::path::Path;
use std::sync::Arc;

use crate::{error::RenderResult, perlin::Perlin, Color};
use lux_math::Vec3;

/// Decoded image in linear RGB, row-major with row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load an image file and convert it to linear color (gamma 2.2).
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?.into_rgb32f();
        let (width, height) = img.dimensions();

        let pixels = img
            .pixels()
            .map(|p| Vec3::new(p[0].powf(2.2), p[1].powf(2.2), p[2].powf(2.2)))
            .collect();

        log::info!("Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(Self::new(width, height, pixels))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Nearest texel for clamped uv; v = 0 is the bottom row.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.is_empty() {
            // Debug magenta marks a missing image
            return Color::new(1.0, 0.0, 1.0);
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f32) as u32).min(self.width - 1);
        let j = ((v * self.height as f32) as u32).min(self.height - 1);

        self.pixels
            .get((j * self.width + i) as usize)
            .copied()
            .unwrap_or(Color::new(1.0, 0.0, 1.0))
    }
}

/// A texture evaluated at surface coordinates and world position.
#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    /// 3-D checkerboard alternating between two textures.
    Checker {
        inv_scale: f32,
        even: Box<Texture>,
        odd: Box<Texture>,
    },
    Image(Arc<ImageData>),
    /// Marble-like turbulence.
    Noise { scale: f32, perlin: Arc<Perlin> },
}

impl Texture {
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        Texture::Solid(Color::new(r, g, b))
    }

    pub fn checker(scale: f32, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Box::new(even),
            odd: Box::new(odd),
        }
    }

    pub fn noise(scale: f32, perlin: Arc<Perlin>) -> Self {
        Texture::Noise { scale, perlin }
    }

    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let cell = (p * *inv_scale).floor();
                let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);
                if parity == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Texture::Image(image) => image.sample(u, v),
            Texture::Noise { scale, perlin } => {
                Color::splat(0.5) * (1.0 + (scale * p.z + 10.0 * perlin.turb(p, 7)).sin())
            }
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_checker_parity() {
        let white = Texture::solid(1.0, 1.0, 1.0);
        let black = Texture::solid(0.0, 0.0, 0.0);
        let checker = Texture::checker(1.0, white, black);

        assert_eq!(checker.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), Color::ONE);
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), Color::ZERO);
        // Negative cells keep alternating across the origin
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5)), Color::ZERO);
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(-0.5, -0.5, 0.5)), Color::ONE);
    }

    #[test]
    fn test_image_nearest_texel_flips_v() {
        // 2x2: top row red/green, bottom row blue/white
        let image = ImageData::new(
            2,
            2,
            vec![
                Color::X,
                Color::Y,
                Color::Z,
                Color::ONE,
            ],
        );
        let tex = Texture::Image(Arc::new(image));

        assert_eq!(tex.value(0.0, 1.0, Vec3::ZERO), Color::X);
        assert_eq!(tex.value(1.0, 1.0, Vec3::ZERO), Color::Y);
        assert_eq!(tex.value(0.0, 0.0, Vec3::ZERO), Color::Z);
        // Out of range uv is clamped
        assert_eq!(tex.value(7.0, -3.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_empty_image_is_magenta() {
        let tex = Texture::Image(Arc::new(ImageData::new(0, 0, Vec::new())));
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_noise_in_unit_range() {
        let perlin = Arc::new(Perlin::new(&mut StdRng::seed_from_u64(4)));
        let tex = Texture::noise(4.0, perlin);

        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.73);
            let c = tex.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.z);
        }
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(ImageData::load("/definitely/not/here.png").is_err());
    }
}
