//! GPU-side buffer layouts.
//!
//! Every struct here is `#[repr(C)]` and padded to 16-byte vectors so it
//! matches the WGSL declarations in `shaders/path_trace.wgsl` byte for byte.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lux_renderer::{Camera, RenderConfig, PERLIN_POINT_COUNT};

pub const PRIM_SPHERE: u32 = 0;
pub const PRIM_QUAD: u32 = 1;
pub const PRIM_BOX: u32 = 2;
pub const PRIM_MEDIUM: u32 = 3;
pub const PRIM_TRIANGLE: u32 = 4;

pub const MAT_LAMBERTIAN: u32 = 0;
pub const MAT_METAL: u32 = 1;
pub const MAT_DIELECTRIC: u32 = 2;
pub const MAT_DIFFUSE_LIGHT: u32 = 3;
pub const MAT_ISOTROPIC: u32 = 4;

pub const TEX_SOLID: u32 = 0;
pub const TEX_CHECKER: u32 = 1;
pub const TEX_NOISE: u32 = 2;
pub const TEX_IMAGE: u32 = 3;

/// Marks a BVH node as a leaf in `GpuBvhNode::right`.
pub const LEAF_MARKER: u32 = u32::MAX;

/// Index of the identity entry in the transform table.
pub const IDENTITY_TRANSFORM: u32 = 0;

/// Entries in the kernel's BVH traversal stack (`STACK_SIZE` in the WGSL).
/// A node at depth `d` runs with up to `d` pending siblings on the stack, so
/// the deepest leaf may sit at depth `TRAVERSAL_STACK_SIZE - 1`.
pub const TRAVERSAL_STACK_SIZE: u32 = 32;

/// One leaf primitive.
///
/// `header` is `[kind, material, transform, extra]`. The meaning of the
/// parameter vectors depends on `kind`:
///
/// | kind     | p0              | p1            | p2       | p3             | p4          |
/// |----------|-----------------|---------------|----------|----------------|-------------|
/// | sphere   | center0, radius | motion        |          |                |             |
/// | quad     | q               | u             | v        | normal, d      | w, area     |
/// | triangle | v0              | v1            | v2       | normal, area   |             |
/// | medium   | boundary params (sphere: as above, box: min / max) | | density | |   |
///
/// For media `extra` holds the boundary kind (`PRIM_SPHERE` or `PRIM_BOX`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct GpuPrimitive {
    pub header: [u32; 4],
    pub p0: [f32; 4],
    pub p1: [f32; 4],
    pub p2: [f32; 4],
    pub p3: [f32; 4],
    pub p4: [f32; 4],
}

impl GpuPrimitive {
    pub fn new(kind: u32, material: u32, transform: u32) -> Self {
        Self {
            header: [kind, material, transform, 0],
            ..Default::default()
        }
    }

    pub fn kind(&self) -> u32 {
        self.header[0]
    }

    pub fn material(&self) -> u32 {
        self.header[1]
    }

    pub fn transform(&self) -> u32 {
        self.header[2]
    }
}

/// Rigid transform pair, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuTransform {
    pub world_to_object: [[f32; 4]; 4],
    pub object_to_world: [[f32; 4]; 4],
}

impl GpuTransform {
    pub fn from_object_to_world(object_to_world: Mat4) -> Self {
        Self {
            world_to_object: object_to_world.inverse().to_cols_array_2d(),
            object_to_world: object_to_world.to_cols_array_2d(),
        }
    }

    pub fn identity() -> Self {
        Self::from_object_to_world(Mat4::IDENTITY)
    }
}

/// `header` is `[kind, texture, 0, 0]`. Metal keeps albedo and fuzz in
/// `params`, dielectric keeps its index of refraction in `params[0]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub header: [u32; 4],
    pub params: [f32; 4],
}

/// `header` is `[kind, a, b, c]`:
/// - solid: color in `params`
/// - checker: `a`/`b` are the even/odd texture indices, `params[0]` the inverse scale
/// - noise: `a` is the Perlin table index, `params[0]` the scale
/// - image: `a` is the texel offset, `b`/`c` the width/height
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuTexture {
    pub header: [u32; 4],
    pub params: [f32; 4],
}

/// Perlin lattice. `perm[i]` packs `(perm_x[i], perm_y[i], perm_z[i], 0)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuPerlin {
    pub ranvec: [[f32; 4]; PERLIN_POINT_COUNT],
    pub perm: [[u32; 4]; PERLIN_POINT_COUNT],
}

/// BVH node. Branches store child node indices in `left`/`right`; leaves
/// store `LEAF_MARKER` in `right` and a primitive index in `left`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuBvhNode {
    pub min: [f32; 3],
    pub left: u32,
    pub max: [f32; 3],
    pub right: u32,
}

impl GpuBvhNode {
    pub fn is_leaf(&self) -> bool {
        self.right == LEAF_MARKER
    }
}

/// Per-frame constants.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuUniforms {
    pub center: [f32; 4],
    pub pixel00: [f32; 4],
    pub delta_u: [f32; 4],
    pub delta_v: [f32; 4],
    /// Defocus disk u axis; `w` is the defocus angle
    pub defocus_u: [f32; 4],
    pub defocus_v: [f32; 4],
    pub background: [f32; 4],
    /// width, height, samples per pixel, max depth
    pub dims: [u32; 4],
    /// seed, light offset, light count, sky gradient flag
    pub extra: [u32; 4],
}

impl GpuUniforms {
    pub fn new(camera: &Camera, config: &RenderConfig, light_offset: u32, light_count: u32) -> Self {
        let (delta_u, delta_v) = camera.pixel_deltas();
        let (defocus_u, defocus_v) = camera.defocus_disk();
        let background = camera.background();

        Self {
            center: camera.center().extend(1.0).to_array(),
            pixel00: camera.pixel00_loc().extend(1.0).to_array(),
            delta_u: delta_u.extend(0.0).to_array(),
            delta_v: delta_v.extend(0.0).to_array(),
            defocus_u: defocus_u.extend(camera.defocus_angle()).to_array(),
            defocus_v: defocus_v.extend(0.0).to_array(),
            background: background.extend(1.0).to_array(),
            dims: [
                camera.image_width(),
                camera.image_height(),
                camera.samples_per_pixel(),
                camera.max_depth(),
            ],
            extra: [
                fold_seed(config.seed),
                light_offset,
                light_count,
                config.use_sky_gradient as u32,
            ],
        }
    }
}

/// Fold a 64-bit seed into the kernel's 32-bit one.
fn fold_seed(seed: u64) -> u32 {
    (seed as u32) ^ ((seed >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_renderer::CameraSettings;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes_match_shader() {
        assert_eq!(size_of::<GpuPrimitive>(), 96);
        assert_eq!(size_of::<GpuTransform>(), 128);
        assert_eq!(size_of::<GpuMaterial>(), 32);
        assert_eq!(size_of::<GpuTexture>(), 32);
        assert_eq!(size_of::<GpuPerlin>(), 8192);
        assert_eq!(size_of::<GpuBvhNode>(), 32);
        assert_eq!(size_of::<GpuUniforms>(), 144);
    }

    #[test]
    fn test_transform_inverse() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let t = GpuTransform::from_object_to_world(m);
        let back = Mat4::from_cols_array_2d(&t.world_to_object) * Mat4::from_cols_array_2d(&t.object_to_world);
        assert!(back.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_uniforms_from_camera() {
        let camera = Camera::new(
            CameraSettings::default()
                .with_image(64, 2.0)
                .with_quality(16, 5)
                .with_background(glam::Vec3::new(0.1, 0.2, 0.3)),
        )
        .unwrap();
        let config = RenderConfig::default().with_seed(7).with_sky_gradient(true);
        let uniforms = GpuUniforms::new(&camera, &config, 10, 2);

        assert_eq!(uniforms.dims, [64, 32, 16, 5]);
        assert_eq!(uniforms.extra, [7, 10, 2, 1]);
        assert_eq!(uniforms.background[..3], [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_seed_folding_uses_high_bits() {
        assert_ne!(fold_seed(1), fold_seed(1 | (1 << 32)));
    }
}
