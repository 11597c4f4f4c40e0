//! Simple path tracer example.
//!
//! Renders a few spheres under a sky gradient and saves to PPM format.

use lux_renderer::{render, Camera, CameraSettings, Color, Material, RenderConfig, Scene, Sphere, Vec3};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let start = std::time::Instant::now();
    let scene = build_scene()?;
    println!("Scene built in {:?}", start.elapsed());

    let camera = Camera::new(
        CameraSettings::default()
            .with_image(400, 16.0 / 9.0)
            .with_quality(50, 10)
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.6, 10.0),
    )?;
    let config = RenderConfig::default().with_sky_gradient(true);

    let image = render(&camera, &scene, &config)?;

    let file = File::create("simple_render.ppm")?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "P3\n{} {}\n255", image.width, image.height)?;
    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    println!("Saved simple_render.ppm");

    Ok(())
}

fn build_scene() -> Result<Scene, lux_renderer::RenderError> {
    let mut builder = Scene::builder();

    let ground = builder.add_material(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    let glass = builder.add_material(Material::dielectric(1.5));
    let diffuse = builder.add_material(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let metal = builder.add_material(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));

    builder
        .add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground))
        .add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass))
        .add(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, diffuse))
        .add(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, metal));

    builder.build()
}
