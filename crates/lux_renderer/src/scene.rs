//! Scene assembly: the world BVH, the light list and the material arena.

use crate::{
    bvh::BvhNode,
    error::RenderResult,
    hittable::{HittableList, MaterialId},
    Material, Object,
};

/// A render-ready scene. Read-only once built and shared by all workers.
pub struct Scene {
    world: Object,
    lights: HittableList,
    materials: Vec<Material>,
}

impl Scene {
    /// Start building a scene.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Root of the geometry (a BVH over everything added).
    pub fn world(&self) -> &Object {
        &self.world
    }

    /// Objects used for light importance sampling.
    pub fn lights(&self) -> &HittableList {
        &self.lights
    }

    /// Look up a material. `MaterialId::NONE` and unknown ids return None.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        if id.is_none() {
            return None;
        }
        self.materials.get(id.index())
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

/// Collects materials, objects and lights before building the BVH.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Object>,
    lights: HittableList,
    materials: Vec<Material>,
}

impl SceneBuilder {
    /// Register a material and return its handle.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    /// Add visible geometry.
    pub fn add(&mut self, object: impl Into<Object>) -> &mut Self {
        self.objects.push(object.into());
        self
    }

    /// Add geometry that is only used to sample lights. It does not need a
    /// material and is not rendered unless also passed to `add`.
    pub fn add_light(&mut self, object: impl Into<Object>) -> &mut Self {
        self.lights.add(object);
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Build the world BVH.
    pub fn build(self) -> RenderResult<Scene> {
        let object_count = self.objects.len();
        let world = BvhNode::new(self.objects)?;

        log::info!(
            "Scene built: {} objects, {} lights, {} materials",
            object_count,
            self.lights.len(),
            self.materials.len()
        );

        if self.lights.is_empty() {
            log::warn!("Scene has no lights registered for sampling; using BRDF sampling only");
        }

        Ok(Scene {
            world: Object::from(world),
            lights: self.lights,
            materials: self.materials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::RenderError, Color, HitRecord, Hittable, Quad, Sphere};
    use lux_math::{Interval, Ray, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_scene_is_error() {
        let builder = Scene::builder();
        assert!(matches!(builder.build(), Err(RenderError::EmptyScene)));
    }

    #[test]
    fn test_material_arena() {
        let mut builder = Scene::builder();
        let red = builder.add_material(Material::lambertian(Color::new(1.0, 0.0, 0.0)));
        let light = builder.add_material(Material::diffuse_light(Color::splat(4.0)));
        assert_eq!(red, MaterialId(0));
        assert_eq!(light, MaterialId(1));

        builder.add(Sphere::new(Vec3::ZERO, 1.0, red));
        let lamp = Quad::new(Vec3::new(-1.0, 3.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, light);
        builder.add(lamp.clone()).add_light(lamp);
        assert_eq!(builder.object_count(), 2);

        let scene = builder.build().unwrap();
        assert_eq!(scene.lights().len(), 1);
        assert!(scene.material(MaterialId::NONE).is_none());
        assert!(scene.material(MaterialId(7)).is_none());
        assert!(matches!(scene.material(light), Some(Material::DiffuseLight { .. })));

        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, 0.0);
        assert!(scene.world().hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert_eq!(rec.material, red);
    }
}
