//! lux renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer with light importance sampling, participating
//! media and motion blur. Geometry, materials and the estimator here are
//! shared with the GPU backend, which flattens a [`Scene`] into buffers.

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod instance;
mod material;
mod medium;
mod object;
mod pdf;
mod perlin;
mod quad;
mod renderer;
pub mod rng;
mod scene;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{
    coverage_mask, generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::{split_items, BvhNode};
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList, MaterialId};
pub use instance::{RotateY, Translate};
pub use material::{Color, Material, ScatterKind, ScatterRecord};
pub use medium::ConstantMedium;
pub use object::Object;
pub use pdf::{Onb, Pdf};
pub use perlin::{Perlin, POINT_COUNT as PERLIN_POINT_COUNT};
pub use quad::{make_box, BoxShape, Quad};
pub use renderer::{
    color_to_rgba, encode_color, linear_to_gamma, ray_color, render, render_pixel, sanitize,
    Background, ImageBuffer, RenderConfig,
};
pub use scene::{Scene, SceneBuilder};
pub use sphere::Sphere;
pub use texture::{ImageData, Texture};
pub use triangle::{Mesh, Triangle};

/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Interval, Ray, Vec3};
