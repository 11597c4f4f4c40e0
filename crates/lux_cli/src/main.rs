//! `lux` - render a demo scene on the CPU or GPU and write a PPM.

mod obj;
mod ppm;
mod scenes;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use lux_renderer::{Camera, CameraSettings, RenderConfig};
use serde::Deserialize;

use scenes::SceneKind;

const USAGE: &str = "usage: lux [--gpu] [--threads N] [--settings file.json] \
[--scene cornell|figure|spheres] [--assets DIR] [-o out.ppm]";

#[derive(Debug, Clone, PartialEq)]
struct Args {
    gpu: bool,
    threads: Option<usize>,
    settings: Option<PathBuf>,
    scene: SceneKind,
    assets: PathBuf,
    output: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            gpu: false,
            threads: None,
            settings: None,
            scene: SceneKind::Cornell,
            assets: PathBuf::from("assets"),
            output: PathBuf::from("image.ppm"),
        }
    }
}

impl Args {
    /// Parse command-line arguments (without the program name).
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Self>> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{name} expects a value\n{USAGE}"))
            };

            match arg.as_str() {
                "--gpu" => parsed.gpu = true,
                "--threads" => {
                    let v = value("--threads")?;
                    parsed.threads = Some(v.parse().with_context(|| format!("invalid thread count '{v}'"))?);
                }
                "--settings" => parsed.settings = Some(PathBuf::from(value("--settings")?)),
                "--scene" => parsed.scene = value("--scene")?.parse()?,
                "--assets" => parsed.assets = PathBuf::from(value("--assets")?),
                "-o" | "--output" => parsed.output = PathBuf::from(value("--output")?),
                "-h" | "--help" => return Ok(None),
                other => anyhow::bail!("unknown argument '{other}'\n{USAGE}"),
            }
        }

        Ok(Some(parsed))
    }
}

/// Settings file contents. Camera fields override the scene's own camera;
/// render fields override the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    camera: Option<CameraSettings>,
    render: Option<RenderConfig>,
}

impl Settings {
    fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse settings {}", path.display()))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let start = Instant::now();
    let demo = scenes::build(args.scene, &args.assets)?;
    log::info!("Built {:?} scene in {:.2?}", args.scene, start.elapsed());

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let camera_settings = settings.camera.unwrap_or(demo.camera);
    let mut config = settings
        .render
        .unwrap_or_else(|| RenderConfig::default().with_sky_gradient(demo.sky_gradient));
    if let Some(threads) = args.threads {
        config.threads = threads;
    }

    let camera = Camera::new(camera_settings).context("invalid camera settings")?;

    let image = if args.gpu {
        log::info!("Rendering on the GPU");
        lux_gpu::render(&camera, &demo.scene, &config).context("GPU render failed")?
    } else {
        log::info!("Rendering on the CPU");
        lux_renderer::render(&camera, &demo.scene, &config).context("CPU render failed")?
    };

    ppm::save_ppm(&args.output, &image)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Wrote {} in {:.2?} total", args.output.display(), start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), Some(Args::default()));
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "--gpu", "--threads", "4", "--settings", "s.json", "--scene", "spheres", "--assets", "a",
            "-o", "out.ppm",
        ])
        .unwrap()
        .unwrap();

        assert!(args.gpu);
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.settings, Some(PathBuf::from("s.json")));
        assert_eq!(args.scene, SceneKind::Spheres);
        assert_eq!(args.assets, PathBuf::from("a"));
        assert_eq!(args.output, PathBuf::from("out.ppm"));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["--threads"]).is_err());
        assert!(parse(&["--threads", "many"]).is_err());
        assert!(parse(&["--scene", "teapot"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn test_settings_json() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "camera": { "image_width": 32, "samples_per_pixel": 4 },
                "render": { "threads": 2, "seed": 9 }
            }"#,
        )
        .unwrap();

        let camera = settings.camera.unwrap();
        assert_eq!(camera.image_width, 32);
        assert_eq!(camera.samples_per_pixel, 4);
        assert_eq!(camera.max_depth, CameraSettings::default().max_depth);

        let render = settings.render.unwrap();
        assert_eq!(render.threads, 2);
        assert_eq!(render.seed, 9);

        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert!(empty.camera.is_none() && empty.render.is_none());
    }
}
