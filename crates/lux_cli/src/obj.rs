//! OBJ loading into triangle meshes.

use std::path::Path;

use anyhow::{Context, Result};
use lux_renderer::{MaterialId, Mesh, Vec3};

/// Load every model in an OBJ file into a single mesh.
pub fn load_obj<P: AsRef<Path>>(path: P, material: MaterialId) -> Result<Mesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("failed to load OBJ {}", path.display()))?;

    if models.is_empty() {
        anyhow::bail!("No models found in OBJ file {}", path.display());
    }

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for model in &models {
        let base = vertices.len() as u32;
        let mesh = &model.mesh;
        vertices.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
        indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    log::info!(
        "Loaded {}: {} models, {} vertices, {} triangles",
        path.display(),
        models.len(),
        vertices.len(),
        indices.len() / 3
    );

    Ok(Mesh::new(&vertices, &indices, material)?)
}
