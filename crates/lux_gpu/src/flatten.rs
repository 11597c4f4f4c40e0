//! Scene flattening for the GPU.
//!
//! The CPU scene graph is a tree of enums behind `Arc`s. The kernel wants
//! flat tables instead: leaf primitives carrying a transform index, a BVH
//! addressed by node index, and material/texture tables addressed by id.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use lux_math::{Aabb, Mat4Ext};
use lux_renderer::{
    split_items, BvhNode, Hittable, ImageData, Material, Object, Perlin, Scene, Texture,
    PERLIN_POINT_COUNT,
};

use crate::error::{GpuError, GpuResult};
use crate::layout::*;

/// A scene packed into GPU buffers.
///
/// Primitives `[0, light_offset)` belong to the world BVH, the
/// `light_count` primitives after them are the light sampling list.
#[derive(Debug, Clone)]
pub struct GpuScene {
    pub primitives: Vec<GpuPrimitive>,
    pub transforms: Vec<GpuTransform>,
    pub materials: Vec<GpuMaterial>,
    pub textures: Vec<GpuTexture>,
    pub texels: Vec<[f32; 4]>,
    pub perlins: Vec<GpuPerlin>,
    pub nodes: Vec<GpuBvhNode>,
    /// Depth of the deepest BVH leaf; the root is depth 0
    pub bvh_depth: u32,
    pub light_offset: u32,
    pub light_count: u32,
}

impl GpuScene {
    pub fn primitive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.primitives)
    }

    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    pub fn material_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    pub fn texture_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.textures)
    }

    pub fn texel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn perlin_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.perlins)
    }

    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Number of primitives reachable through the BVH.
    pub fn world_primitive_count(&self) -> usize {
        self.light_offset as usize
    }
}

/// Flatten a scene into GPU tables.
///
/// Boxes become their six quads and meshes their triangles. A medium
/// boundary must be a sphere or a box, optionally under translations and
/// rotations; anything else is rejected.
pub fn flatten_scene(scene: &Scene) -> GpuResult<GpuScene> {
    let mut flattener = Flattener::new();

    for material in scene.materials() {
        let gpu_material = flattener.material(material);
        flattener.materials.push(gpu_material);
    }

    let mut world = Vec::new();
    flattener.collect(scene.world(), Mat4::IDENTITY, IDENTITY_TRANSFORM, &mut world)?;
    if world.is_empty() {
        return Err(lux_renderer::RenderError::EmptyScene.into());
    }

    let mut lights = Vec::new();
    for light in scene.lights().objects() {
        flattener.collect(light, Mat4::IDENTITY, IDENTITY_TRANSFORM, &mut lights)?;
    }

    let light_offset = world.len() as u32;
    let light_count = lights.len() as u32;

    let mut items: Vec<(u32, Aabb)> = world
        .iter()
        .enumerate()
        .map(|(i, (_, bbox))| (i as u32, *bbox))
        .collect();
    let mut nodes = Vec::with_capacity(2 * items.len());
    let mut bvh_depth = 0;
    build_nodes(&mut items, 0, &mut bvh_depth, &mut nodes);
    check_traversal_depth(bvh_depth)?;

    let primitives: Vec<GpuPrimitive> = world
        .into_iter()
        .chain(lights)
        .map(|(primitive, _)| primitive)
        .collect();

    log::info!(
        "Flattened scene: {} primitives ({} lights), {} BVH nodes (depth {}), {} transforms, {} materials, {} textures, {} texels",
        primitives.len(),
        light_count,
        nodes.len(),
        bvh_depth,
        flattener.transforms.len(),
        flattener.materials.len(),
        flattener.textures.len(),
        flattener.texels.len()
    );

    Ok(GpuScene {
        primitives,
        transforms: flattener.transforms,
        materials: flattener.materials,
        textures: flattener.textures,
        texels: flattener.texels,
        perlins: flattener.perlins,
        nodes,
        bvh_depth,
        light_offset,
        light_count,
    })
}

/// The kernel walks the BVH with a fixed-size stack; a deeper tree would
/// silently drop subtrees, so refuse it here.
fn check_traversal_depth(depth: u32) -> GpuResult<()> {
    if depth >= TRAVERSAL_STACK_SIZE {
        return Err(GpuError::Unsupported(format!(
            "BVH depth {depth} exceeds the {TRAVERSAL_STACK_SIZE}-entry traversal stack"
        )));
    }
    Ok(())
}

/// Depth-first BVH layout; the root is node 0. `max_depth` tracks the
/// deepest leaf.
fn build_nodes(items: &mut [(u32, Aabb)], depth: u32, max_depth: &mut u32, nodes: &mut Vec<GpuBvhNode>) -> u32 {
    let index = nodes.len() as u32;

    if let [(primitive, bbox)] = items {
        *max_depth = (*max_depth).max(depth);
        nodes.push(GpuBvhNode {
            min: bbox.min().to_array(),
            left: *primitive,
            max: bbox.max().to_array(),
            right: LEAF_MARKER,
        });
        return index;
    }

    let (bbox, mid) = split_items(items, |item: &(u32, Aabb)| item.1);
    nodes.push(GpuBvhNode {
        min: bbox.min().to_array(),
        left: 0,
        max: bbox.max().to_array(),
        right: 0,
    });

    let (left_items, right_items) = items.split_at_mut(mid);
    let left = build_nodes(left_items, depth + 1, max_depth, nodes);
    let right = build_nodes(right_items, depth + 1, max_depth, nodes);

    let node = &mut nodes[index as usize];
    node.left = left;
    node.right = right;

    index
}

struct Flattener {
    transforms: Vec<GpuTransform>,
    materials: Vec<GpuMaterial>,
    textures: Vec<GpuTexture>,
    texels: Vec<[f32; 4]>,
    perlins: Vec<GpuPerlin>,
    /// Image and Perlin tables are shared by pointer
    image_offsets: HashMap<*const ImageData, u32>,
    perlin_indices: HashMap<*const Perlin, u32>,
}

impl Flattener {
    fn new() -> Self {
        Self {
            transforms: vec![GpuTransform::identity()],
            materials: Vec::new(),
            textures: Vec::new(),
            texels: Vec::new(),
            perlins: Vec::new(),
            image_offsets: HashMap::new(),
            perlin_indices: HashMap::new(),
        }
    }

    fn push_transform(&mut self, object_to_world: Mat4) -> u32 {
        self.transforms
            .push(GpuTransform::from_object_to_world(object_to_world));
        (self.transforms.len() - 1) as u32
    }

    /// Append the leaves under `object` to `out` with their world boxes.
    fn collect(
        &mut self,
        object: &Object,
        to_world: Mat4,
        transform: u32,
        out: &mut Vec<(GpuPrimitive, Aabb)>,
    ) -> GpuResult<()> {
        let world_box = |bbox: Aabb| {
            if transform == IDENTITY_TRANSFORM {
                bbox
            } else {
                to_world.transform_aabb(&bbox)
            }
        };

        match object {
            Object::Sphere(sphere) => {
                let center = sphere.center(0.0);
                let mut prim = GpuPrimitive::new(PRIM_SPHERE, sphere.material().0, transform);
                prim.p0 = center.extend(sphere.radius()).to_array();
                prim.p1 = (sphere.center(1.0) - center).extend(0.0).to_array();
                out.push((prim, world_box(object.bounding_box())));
            }
            Object::Quad(quad) => {
                let q = quad.corner();
                let (u, v) = quad.edges();
                let n = u.cross(v);
                let normal = n.normalize_or_zero();
                let n_len_sq = n.length_squared();
                let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

                let mut prim = GpuPrimitive::new(PRIM_QUAD, quad.material().0, transform);
                prim.p0 = q.extend(0.0).to_array();
                prim.p1 = u.extend(0.0).to_array();
                prim.p2 = v.extend(0.0).to_array();
                prim.p3 = normal.extend(normal.dot(q)).to_array();
                prim.p4 = w.extend(quad.area()).to_array();
                out.push((prim, world_box(object.bounding_box())));
            }
            Object::Triangle(triangle) => {
                let [v0, v1, v2] = triangle.vertices();
                let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

                let mut prim = GpuPrimitive::new(PRIM_TRIANGLE, triangle.material().0, transform);
                prim.p0 = v0.extend(0.0).to_array();
                prim.p1 = v1.extend(0.0).to_array();
                prim.p2 = v2.extend(0.0).to_array();
                prim.p3 = normal.extend(triangle.area()).to_array();
                out.push((prim, world_box(object.bounding_box())));
            }
            Object::Box(shape) => {
                for side in shape.sides().objects() {
                    self.collect(side, to_world, transform, out)?;
                }
            }
            Object::Mesh(mesh) => {
                for triangle in mesh.triangles() {
                    self.collect(&Object::Triangle(triangle.clone()), to_world, transform, out)?;
                }
            }
            Object::Medium(medium) => {
                let (kind, p0, p1, boundary_to_world) =
                    medium_boundary(medium.boundary(), to_world)?;
                let boundary_transform = if boundary_to_world == to_world {
                    transform
                } else {
                    self.push_transform(boundary_to_world)
                };

                let mut prim =
                    GpuPrimitive::new(PRIM_MEDIUM, medium.phase_function().0, boundary_transform);
                prim.header[3] = kind;
                prim.p0 = p0;
                prim.p1 = p1;
                prim.p2 = [medium.density(), 0.0, 0.0, 0.0];
                out.push((prim, world_box(object.bounding_box())));
            }
            Object::Translate(translate) => {
                let m = to_world * Mat4::from_translation(translate.offset());
                let index = self.push_transform(m);
                self.collect(translate.object(), m, index, out)?;
            }
            Object::RotateY(rotate) => {
                let m = to_world * Mat4::from_rotation_y(rotate.degrees().to_radians());
                let index = self.push_transform(m);
                self.collect(rotate.object(), m, index, out)?;
            }
            Object::List(list) => {
                for child in list.objects() {
                    self.collect(child, to_world, transform, out)?;
                }
            }
            Object::Bvh(node) => self.collect_bvh(node, to_world, transform, out)?,
        }

        Ok(())
    }

    fn collect_bvh(
        &mut self,
        node: &BvhNode,
        to_world: Mat4,
        transform: u32,
        out: &mut Vec<(GpuPrimitive, Aabb)>,
    ) -> GpuResult<()> {
        match node {
            BvhNode::Branch { left, right, .. } => {
                self.collect_bvh(left, to_world, transform, out)?;
                self.collect_bvh(right, to_world, transform, out)
            }
            BvhNode::Leaf { object, .. } => self.collect(object, to_world, transform, out),
        }
    }

    fn material(&mut self, material: &Material) -> GpuMaterial {
        match material {
            Material::Lambertian { albedo } => GpuMaterial {
                header: [MAT_LAMBERTIAN, self.texture(albedo), 0, 0],
                params: [0.0; 4],
            },
            Material::Metal { albedo, fuzz } => GpuMaterial {
                header: [MAT_METAL, 0, 0, 0],
                params: albedo.extend(*fuzz).to_array(),
            },
            Material::Dielectric { ior } => GpuMaterial {
                header: [MAT_DIELECTRIC, 0, 0, 0],
                params: [*ior, 0.0, 0.0, 0.0],
            },
            Material::DiffuseLight { emit } => GpuMaterial {
                header: [MAT_DIFFUSE_LIGHT, self.texture(emit), 0, 0],
                params: [0.0; 4],
            },
            Material::Isotropic { albedo } => GpuMaterial {
                header: [MAT_ISOTROPIC, self.texture(albedo), 0, 0],
                params: [0.0; 4],
            },
        }
    }

    fn texture(&mut self, texture: &Texture) -> u32 {
        let index = self.textures.len() as u32;
        self.textures.push(GpuTexture::default());

        let gpu_texture = match texture {
            Texture::Solid(color) => solid(*color),
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let even = self.texture(even);
                let odd = self.texture(odd);
                GpuTexture {
                    header: [TEX_CHECKER, even, odd, 0],
                    params: [*inv_scale, 0.0, 0.0, 0.0],
                }
            }
            Texture::Image(image) if image.is_empty() => solid(Vec3::new(1.0, 0.0, 1.0)),
            Texture::Image(image) => GpuTexture {
                header: [TEX_IMAGE, self.image(image), image.width, image.height],
                params: [0.0; 4],
            },
            Texture::Noise { scale, perlin } => GpuTexture {
                header: [TEX_NOISE, self.perlin(perlin), 0, 0],
                params: [*scale, 0.0, 0.0, 0.0],
            },
        };

        self.textures[index as usize] = gpu_texture;
        index
    }

    fn image(&mut self, image: &Arc<ImageData>) -> u32 {
        let key = Arc::as_ptr(image);
        if let Some(&offset) = self.image_offsets.get(&key) {
            return offset;
        }

        let offset = self.texels.len() as u32;
        self.texels
            .extend(image.pixels.iter().map(|c| c.extend(1.0).to_array()));
        self.image_offsets.insert(key, offset);
        offset
    }

    fn perlin(&mut self, perlin: &Arc<Perlin>) -> u32 {
        let key = Arc::as_ptr(perlin);
        if let Some(&index) = self.perlin_indices.get(&key) {
            return index;
        }

        let mut table = GpuPerlin {
            ranvec: [[0.0; 4]; PERLIN_POINT_COUNT],
            perm: [[0; 4]; PERLIN_POINT_COUNT],
        };
        let [perm_x, perm_y, perm_z] = perlin.permutations();
        for (i, gradient) in perlin.gradients().iter().enumerate() {
            table.ranvec[i] = gradient.extend(0.0).to_array();
            table.perm[i] = [perm_x[i], perm_y[i], perm_z[i], 0];
        }

        let index = self.perlins.len() as u32;
        self.perlins.push(table);
        self.perlin_indices.insert(key, index);
        index
    }
}

fn solid(color: Vec3) -> GpuTexture {
    GpuTexture {
        header: [TEX_SOLID, 0, 0, 0],
        params: color.extend(1.0).to_array(),
    }
}

/// Resolve a medium boundary to `(kind, p0, p1, boundary_to_world)`.
fn medium_boundary(object: &Object, to_world: Mat4) -> GpuResult<(u32, [f32; 4], [f32; 4], Mat4)> {
    match object {
        Object::Sphere(sphere) => {
            let center = sphere.center(0.0);
            Ok((
                PRIM_SPHERE,
                center.extend(sphere.radius()).to_array(),
                (sphere.center(1.0) - center).extend(0.0).to_array(),
                to_world,
            ))
        }
        Object::Box(shape) => Ok((
            PRIM_BOX,
            shape.min().extend(0.0).to_array(),
            shape.max().extend(0.0).to_array(),
            to_world,
        )),
        Object::Translate(translate) => medium_boundary(
            translate.object(),
            to_world * Mat4::from_translation(translate.offset()),
        ),
        Object::RotateY(rotate) => medium_boundary(
            rotate.object(),
            to_world * Mat4::from_rotation_y(rotate.degrees().to_radians()),
        ),
        other => Err(GpuError::Unsupported(format!(
            "medium boundary with object tag {} (expected a sphere or box)",
            other.tag()
        ))),
    }
}
