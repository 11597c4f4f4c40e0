//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Light importance sampling mixed 50/50 with material sampling
//! - Multi-threaded bucket rendering on a rayon pool
//! - Gamma correction on output

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::error::{RenderError, RenderResult};
use crate::material::ScatterKind;
use crate::pdf::Pdf;
use crate::rng::pixel_seed;
use crate::{Camera, Color, HitRecord, Hittable, Scene};
use lux_math::{Interval, Ray};

/// Render configuration shared by both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Worker threads; 0 uses every available core
    pub threads: usize,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Base seed for the per-pixel random streams
    pub seed: u64,
    /// Whether to use sky gradient instead of the camera's solid background
    pub use_sky_gradient: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            use_sky_gradient: false,
        }
    }
}

impl RenderConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sky_gradient(mut self, enabled: bool) -> Self {
        self.use_sky_gradient = enabled;
        self
    }

    /// Background seen by rays that leave the scene.
    pub fn background(&self, camera: &Camera) -> Background {
        if self.use_sky_gradient {
            Background::SkyGradient
        } else {
            Background::Solid(camera.background())
        }
    }
}

/// Radiance for rays that hit nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Color),
    SkyGradient,
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Solid(color) => *color,
            Background::SkyGradient => sky_gradient(ray),
        }
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn ray_color(
    ray: &Ray,
    depth: u32,
    scene: &Scene,
    background: &Background,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !scene
        .world()
        .hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng)
    {
        return background.color(ray);
    }

    // Light-sampling-only geometry has no material and absorbs
    let Some(material) = scene.material(rec.material) else {
        return Color::ZERO;
    };

    let emitted = material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    let Some(srec) = material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let material_pdf = match srec.kind {
        ScatterKind::Specular(scattered) => {
            let bounce = ray_color(&scattered, depth - 1, scene, background, rng);
            return emitted + sanitize(srec.attenuation * bounce);
        }
        ScatterKind::Diffuse(pdf) => pdf,
    };

    let lights = scene.lights();
    let light_pdf;
    let mixture;
    let pdf: &Pdf = if lights.is_empty() {
        &material_pdf
    } else {
        light_pdf = Pdf::Hittable {
            objects: lights,
            origin: rec.p,
        };
        mixture = Pdf::Mixture(&light_pdf, &material_pdf);
        &mixture
    };

    let scattered = Ray::new(rec.p, pdf.generate(rng), ray.time());
    let pdf_value = pdf.value(scattered.direction(), rng);
    if !pdf_value.is_finite() || pdf_value <= 1e-8 {
        return emitted;
    }

    let scattering_pdf = material.scattering_pdf(ray, &rec, &scattered);
    if scattering_pdf <= 0.0 {
        return emitted;
    }

    let sample_color = ray_color(&scattered, depth - 1, scene, background, rng);
    emitted + sanitize(srec.attenuation * scattering_pdf * sample_color / pdf_value)
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Replace NaN, infinite and negative components with zero.
#[inline]
pub fn sanitize(color: Color) -> Color {
    let fix = |c: f32| if c.is_finite() && c > 0.0 { c } else { 0.0 };
    Color::new(fix(color.x), fix(color.y), fix(color.z))
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-encode and clamp a linear color to [0, 1].
#[inline]
pub fn encode_color(color: Color) -> Color {
    let c = sanitize(color);
    Color::new(
        linear_to_gamma(c.x).clamp(0.0, 1.0),
        linear_to_gamma(c.y).clamp(0.0, 1.0),
        linear_to_gamma(c.z).clamp(0.0, 1.0),
    )
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = encode_color(color);
    [
        (255.999 * c.x) as u8,
        (255.999 * c.y) as u8,
        (255.999 * c.z) as u8,
        255,
    ]
}

/// Render a single pixel with multi-sampling.
///
/// Each pixel owns a generator seeded from its coordinates, so the result
/// does not depend on which worker renders it.
pub fn render_pixel(camera: &Camera, scene: &Scene, x: u32, y: u32, config: &RenderConfig) -> Color {
    let mut rng = StdRng::seed_from_u64(pixel_seed(x, y, config.seed));
    let background = config.background(camera);
    let spp = camera.samples_per_pixel();

    let mut pixel_color = Color::ZERO;
    for _ in 0..spp {
        let ray = camera.get_ray(x, y, &mut rng);
        pixel_color += sanitize(ray_color(&ray, camera.max_depth(), scene, &background, &mut rng));
    }

    pixel_color / spp as f32
}

/// Row-major image of linear colors.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Gamma-encoded RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color)[..3]);
        }
        bytes
    }

    /// Gamma-encoded RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Render the scene on a worker pool, one job per bucket.
///
/// Blocks until every bucket has finished; each pixel must be written
/// exactly once or the render fails with `RenderError::Coverage`.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    let width = camera.image_width();
    let height = camera.image_height();
    let buckets = generate_buckets(width, height, config.bucket_size);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("lux-worker-{i}"))
        .build()?;

    log::info!(
        "Rendering {}x{} @ {} spp, depth {}: {} buckets on {} threads",
        width,
        height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        buckets.len(),
        pool.current_num_threads()
    );

    let start = Instant::now();
    let completed = AtomicUsize::new(0);
    let total = buckets.len().max(1);
    let step = (total / 10).max(1);

    let results: Vec<BucketResult> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| {
                let result = render_bucket(bucket, camera, scene, config);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % step == 0 || done == total {
                    log::info!("Progress: {}/{} buckets ({:.0}%)", done, total, 100.0 * done as f32 / total as f32);
                }
                result
            })
            .collect()
    });

    let image = stitch(width, height, &results)?;

    let elapsed = start.elapsed().as_secs_f64();
    let samples = width as f64 * height as f64 * camera.samples_per_pixel() as f64;
    log::info!(
        "Render finished in {:.2}s ({:.2} Msamples/s)",
        elapsed,
        samples / elapsed.max(1e-9) / 1e6
    );

    Ok(image)
}

/// Assemble bucket results into a row-major image, verifying coverage.
fn stitch(width: u32, height: u32, results: &[BucketResult]) -> RenderResult<ImageBuffer> {
    let mut image = ImageBuffer::new(width, height);
    let mut written = vec![0u32; (width * height) as usize];

    for result in results {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = bucket.x + i as u32 % bucket.width;
            let y = bucket.y + i as u32 / bucket.width;
            if x >= width || y >= height {
                return Err(RenderError::Coverage { x, y, count: 1 });
            }
            let index = (y * width + x) as usize;
            written[index] += 1;
            image.pixels[index] = *color;
        }
    }

    if let Some(index) = written.iter().position(|&count| count != 1) {
        let index = index as u32;
        return Err(RenderError::Coverage {
            x: index % width,
            y: index / width,
            count: written[index as usize],
        });
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;
    use crate::{CameraSettings, Material, Quad, Sphere};
    use lux_math::Vec3;

    #[test]
    fn test_sky_gradient() {
        let up_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::Y, 0.0));
        let down_color = sky_gradient(&Ray::new(Vec3::ZERO, -Vec3::Y, 0.0));

        // blue = (0.5, 0.7, 1.0), white = (1.0, 1.0, 1.0)
        assert!(up_color.x < down_color.x);
        assert_eq!(down_color, Color::ONE);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_sanitize_and_encode() {
        let bad = Color::new(f32::NAN, f32::INFINITY, -2.0);
        assert_eq!(sanitize(bad), Color::ZERO);
        assert_eq!(color_to_rgba(Color::new(4.0, 0.25, 0.0)), [255, 127, 0, 255]);
    }

    #[test]
    fn test_depth_zero_is_black() {
        let mut builder = Scene::builder();
        let m = builder.add_material(Material::lambertian(Color::splat(0.5)));
        builder.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, m));
        let scene = builder.build().unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let bg = Background::Solid(Color::ONE);
        assert_eq!(ray_color(&ray, 0, &scene, &bg, &mut rng), Color::ZERO);

        // A miss returns the background
        let away = Ray::new(Vec3::ZERO, Vec3::Z, 0.0);
        assert_eq!(ray_color(&away, 5, &scene, &bg, &mut rng), Color::ONE);
    }

    #[test]
    fn test_mirror_bounce_is_sanitized() {
        // A mirror facing the camera reflects a light with negative emission
        let mut builder = Scene::builder();
        let mirror = builder.add_material(Material::metal(Color::ONE, 0.0));
        let bogus = builder.add_material(Material::diffuse_light(Color::new(-1.0, f32::NAN, 2.0)));
        builder
            .add(Quad::new(
                Vec3::new(-5.0, -5.0, -2.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 10.0, 0.0),
                mirror,
            ))
            .add(Quad::new(
                Vec3::new(-5.0, -5.0, 3.0),
                Vec3::new(0.0, 10.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                bogus,
            ));
        let scene = builder.build().unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let color = ray_color(&ray, 5, &scene, &Background::Solid(Color::ZERO), &mut rng);

        assert_eq!(color, Color::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_render_pixel_is_deterministic() {
        let mut builder = Scene::builder();
        let m = builder.add_material(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
        builder.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, m));
        let scene = builder.build().unwrap();

        let camera = Camera::new(
            CameraSettings::default()
                .with_image(10, 1.0)
                .with_quality(4, 5)
                .with_background(Color::new(0.5, 0.7, 1.0)),
        )
        .unwrap();
        let config = RenderConfig::default().with_seed(3);

        let a = render_pixel(&camera, &scene, 5, 5, &config);
        let b = render_pixel(&camera, &scene, 5, 5, &config);
        assert_eq!(a, b);
        assert!(a.length() > 0.0);
    }

    #[test]
    fn test_stitch_detects_overlap() {
        let bucket = Bucket::new(0, 0, 2, 1, 0);
        let results = vec![
            BucketResult::new(bucket, vec![Color::ONE; 2]),
            BucketResult::new(bucket, vec![Color::ONE; 2]),
        ];
        match stitch(2, 1, &results) {
            Err(RenderError::Coverage { x, y, count }) => {
                assert_eq!((x, y, count), (0, 0, 2));
            }
            other => panic!("expected coverage error, got {:?}", other.map(|_| ())),
        }

        match stitch(3, 1, &results[..1]) {
            Err(RenderError::Coverage { x, count, .. }) => assert_eq!((x, count), (2, 0)),
            other => panic!("expected coverage error, got {:?}", other.map(|_| ())),
        }
    }
}
