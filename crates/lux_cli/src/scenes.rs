//! Built-in demo scenes.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use lux_renderer::{
    make_box, CameraSettings, Color, ConstantMedium, ImageData, Material, MaterialId, Perlin, Quad,
    RotateY, Scene, SceneBuilder, Sphere, Texture, Translate, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::obj::load_obj;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Cornell,
    Figure,
    Spheres,
}

impl FromStr for SceneKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cornell" => Ok(SceneKind::Cornell),
            "figure" => Ok(SceneKind::Figure),
            "spheres" => Ok(SceneKind::Spheres),
            other => anyhow::bail!("unknown scene '{other}' (expected cornell, figure or spheres)"),
        }
    }
}

/// A scene plus the camera it was composed for.
pub struct Demo {
    pub scene: Scene,
    pub camera: CameraSettings,
    pub sky_gradient: bool,
}

pub fn build(kind: SceneKind, assets: &Path) -> Result<Demo> {
    match kind {
        SceneKind::Cornell => cornell_box(),
        SceneKind::Figure => figure(assets),
        SceneKind::Spheres => spheres(),
    }
}

/// Cornell box with a rotated box and a glass sphere.
pub fn cornell_box() -> Result<Demo> {
    let mut builder = Scene::builder();

    let red = builder.add_material(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let white = builder.add_material(Material::lambertian(Color::splat(0.73)));
    let green = builder.add_material(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let light = builder.add_material(Material::diffuse_light(Color::splat(15.0)));
    let glass = builder.add_material(Material::dielectric(1.5));

    builder
        .add(Quad::new(Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), Vec3::new(0.0, 555.0, 0.0), green))
        .add(Quad::new(Vec3::new(0.0, 0.0, 555.0), Vec3::new(0.0, 0.0, -555.0), Vec3::new(0.0, 555.0, 0.0), red))
        .add(Quad::new(Vec3::new(0.0, 555.0, 0.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), white))
        .add(Quad::new(Vec3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -555.0), white))
        .add(Quad::new(Vec3::new(555.0, 0.0, 555.0), Vec3::new(-555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), white))
        .add(Quad::new(Vec3::new(213.0, 554.0, 227.0), Vec3::new(130.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 105.0), light));

    let tall_box = Translate::new(
        RotateY::new(make_box(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white), 15.0),
        Vec3::new(265.0, 0.0, 295.0),
    );
    builder
        .add(tall_box)
        .add(Sphere::new(Vec3::new(190.0, 90.0, 190.0), 90.0, glass));

    // Sampling targets only
    builder
        .add_light(Quad::new(
            Vec3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            MaterialId::NONE,
        ))
        .add_light(Sphere::new(Vec3::new(190.0, 90.0, 190.0), 90.0, MaterialId::NONE));

    let camera = CameraSettings::default()
        .with_image(600, 1.0)
        .with_quality(1000, 50)
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Color::ZERO);

    Ok(Demo {
        scene: builder.build()?,
        camera,
        sky_gradient: false,
    })
}

/// Street scene: a truck in front of buildings and trees, smoke and fire
/// behind it, lit by a low sun.
pub fn figure(assets: &Path) -> Result<Demo> {
    let mut builder = Scene::builder();

    let grass = builder.add_material(Material::lambertian(image_or(assets, "grass-texture.jpg", Color::new(0.2, 0.5, 0.15))));
    let trunk = builder.add_material(Material::lambertian(image_or(assets, "wood-texture.jpg", Color::new(0.4, 0.25, 0.1))));
    let stone = builder.add_material(Material::lambertian(image_or(assets, "stone-brick.jpg", Color::splat(0.5))));
    let leaves = builder.add_material(Material::lambertian(image_or(assets, "leaves.jpg", Color::new(0.1, 0.4, 0.1))));
    let gravel = builder.add_material(Material::lambertian(image_or(assets, "gravel.jpg", Color::splat(0.35))));
    let red = builder.add_material(Material::lambertian(Color::new(0.8, 0.2, 0.2)));
    let sun = builder.add_material(Material::diffuse_light(Color::new(180.0, 96.0, 36.0)));

    let truck_path = assets.join("meshes").join("Cybertruck.obj");
    match load_obj(&truck_path, red) {
        Ok(truck) => {
            builder.add(truck);
        }
        Err(e) => {
            log::warn!("{e:#}; using a box in place of the truck");
            builder.add(make_box(Vec3::new(-2.5, 0.0, -1.0), Vec3::new(2.5, 1.8, 1.0), red));
        }
    }

    for z in [-4.0, -14.0, 6.0] {
        let building = make_box(Vec3::ZERO, Vec3::new(8.0, 15.0, 4.0), stone);
        builder.add(Translate::new(building, Vec3::new(-15.0, 0.0, z)));
    }

    let trees = [
        (Vec3::new(1.0, 4.0, 1.0), Vec3::new(-8.0, 0.0, 4.0), Vec3::new(-8.0, 5.0, 4.0), 2.5),
        (Vec3::new(0.5, 2.5, 0.5), Vec3::new(-4.0, 0.0, 8.0), Vec3::new(-3.5, 2.5, 8.0), 1.5),
        (Vec3::new(1.0, 3.0, 1.0), Vec3::new(-6.0, 0.0, -8.0), Vec3::new(-6.0, 4.0, -8.0), 2.0),
    ];
    for (size, offset, crown, radius) in trees {
        builder
            .add(Translate::new(make_box(Vec3::ZERO, size, trunk), offset))
            .add(Sphere::new(crown, radius, leaves));
    }

    let smoke = [
        (Vec3::new(-1.5, 0.3, -5.0), 1.0, 1.5, 0.5),
        (Vec3::new(-1.7, 0.4, -4.5), 0.8, 2.0, 0.6),
        (Vec3::new(-1.3, 0.2, -5.5), 0.7, 1.8, 0.4),
    ];
    for (center, radius, density, albedo) in smoke {
        let phase = builder.add_material(Material::isotropic(Color::splat(albedo)));
        builder.add(ConstantMedium::new(
            Sphere::new(center, radius, MaterialId::NONE),
            density,
            phase,
        ));
    }

    add_fire(&mut builder, &mut StdRng::seed_from_u64(7));

    builder
        .add(Quad::new(Vec3::new(-50.0, -0.1, -50.0), Vec3::new(100.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 100.0), grass))
        .add(Quad::new(Vec3::new(-3.0, -0.05, -50.0), Vec3::new(6.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 100.0), gravel));

    let sun_sphere = Sphere::new(Vec3::new(-20.0, 4.0, -8.0), 2.0, sun);
    builder.add(sun_sphere.clone()).add_light(sun_sphere);

    let camera = CameraSettings::default()
        .with_image(800, 16.0 / 9.0)
        .with_quality(200, 50)
        .with_position(Vec3::new(12.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Color::new(0.4, 0.6, 0.9));

    Ok(Demo {
        scene: builder.build()?,
        camera,
        sky_gradient: false,
    })
}

/// Small moving emissive spheres trailing behind the truck.
fn add_fire(builder: &mut SceneBuilder, rng: &mut StdRng) {
    for _ in 0..12 {
        let x_offset = rng.gen_range(-0.3..0.3);
        let y_offset = rng.gen_range(-0.2..0.2);
        let z_offset = rng.gen_range(2.5..4.5);
        let size = rng.gen_range(0.05..0.15);

        let color = Color::new(rng.gen_range(3.0..5.0), rng.gen_range(0.4..1.6), rng.gen_range(0.2..0.4));
        let fire = builder.add_material(Material::diffuse_light(color));

        let center0 = Vec3::new(-1.5 + x_offset, 0.3 + y_offset, -z_offset);
        let center1 = Vec3::new(
            center0.x - 0.2,
            center0.y + rng.gen_range(-0.1..0.1),
            center0.z + rng.gen_range(-0.2..0.2),
        );

        let ember = Sphere::moving(center0, center1, size, fire);
        builder.add(ember.clone()).add_light(ember);
    }
}

/// Load `name` from the asset directory, or fall back to a flat color.
fn image_or(assets: &Path, name: &str, fallback: Color) -> Texture {
    let path = assets.join(name);
    match ImageData::load(&path) {
        Ok(image) => Texture::Image(Arc::new(image)),
        Err(e) => {
            log::warn!("Could not load {}: {e}; using a solid color", path.display());
            Texture::Solid(fallback)
        }
    }
}

/// Checkered ground, marble, glass, metal, fog and motion blur under a
/// sky gradient with an overhead panel light.
pub fn spheres() -> Result<Demo> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut builder = Scene::builder();

    let checker = builder.add_material(Material::lambertian(Texture::checker(
        0.32,
        Texture::solid(0.2, 0.3, 0.1),
        Texture::solid(0.9, 0.9, 0.9),
    )));
    let perlin = Arc::new(Perlin::new(&mut rng));
    let marble = builder.add_material(Material::lambertian(Texture::noise(4.0, perlin)));
    let glass = builder.add_material(Material::dielectric(1.5));
    let metal = builder.add_material(Material::metal(Color::new(0.7, 0.6, 0.5), 0.05));
    let fog = builder.add_material(Material::isotropic(Color::splat(0.9)));
    let panel = builder.add_material(Material::diffuse_light(Color::splat(6.0)));

    builder
        .add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, checker))
        .add(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, marble))
        .add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass))
        .add(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, metal))
        .add(ConstantMedium::new(
            Sphere::new(Vec3::new(2.0, 0.6, 2.5), 0.6, MaterialId::NONE),
            1.2,
            fog,
        ));

    for i in 0..6 {
        let albedo = Color::new(rng.gen(), rng.gen(), rng.gen()) * Color::new(rng.gen(), rng.gen(), rng.gen());
        let diffuse = builder.add_material(Material::lambertian(albedo));
        let center = Vec3::new(-5.0 + 2.0 * i as f32, 0.2, 3.0 + rng.gen_range(-0.5..0.5));
        let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
        builder.add(Sphere::moving(center, center1, 0.2, diffuse));
    }

    let lamp = Quad::new(Vec3::new(-2.0, 6.0, -2.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), panel);
    builder.add(lamp.clone()).add_light(lamp);

    let camera = CameraSettings::default()
        .with_image(400, 16.0 / 9.0)
        .with_quality(100, 50)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Ok(Demo {
        scene: builder.build()?,
        camera,
        sky_gradient: true,
    })
}
