//! Wavefront OBJ/MTL export
//!
//! [`write_obj`] writes the committed polygon mesh as it was generated, with
//! faces kept as n-gons and circle rings as `l` lines. [`write_render_obj`]
//! writes the finished triangle mesh with the modifier stack applied and
//! per-vertex normals. Both emit a `usemtl` line whenever the material slot
//! changes and, when the ship carries a palette, a sibling `.mtl` file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::material::{Appearance, MaterialPalette, MaterialSlot};
use crate::ship::Spaceship;

/// Write the ship's polygon mesh to `path`
///
/// Returns the path of the material library written next to it, if any.
pub fn write_obj(ship: &Spaceship, path: &Path) -> Result<Option<PathBuf>, ExportError> {
    let mtl = write_palette(ship.palette.as_ref(), path)?;
    let mesh = &ship.mesh;

    let mut out = create(path)?;
    write_obj_body(&mut out, ship, mtl.as_deref(), |out| {
        for p in &mesh.positions {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }

        let mut current = None;
        for face in &mesh.faces {
            if current != Some(face.material) {
                writeln!(out, "usemtl {}", face.material.name())?;
                current = Some(face.material);
            }
            write!(out, "f")?;
            for i in &face.indices {
                write!(out, " {}", i + 1)?;
            }
            writeln!(out)?;
        }

        for [a, b] in &mesh.edges {
            writeln!(out, "l {} {}", a + 1, b + 1)?;
        }
        Ok(())
    })
    .map_err(|e| ExportError::io(path, e))?;

    info!(
        "Wrote {:?}: {} vertices, {} faces, {} wires",
        path,
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.edges.len()
    );
    Ok(mtl)
}

/// Write the ship's finished triangle mesh to `path`
///
/// Returns the path of the material library written next to it, if any.
pub fn write_render_obj(ship: &Spaceship, path: &Path) -> Result<Option<PathBuf>, ExportError> {
    let mtl = write_palette(ship.palette.as_ref(), path)?;
    let render = ship.to_render_mesh();

    let mut out = create(path)?;
    write_obj_body(&mut out, ship, mtl.as_deref(), |out| {
        for p in &render.positions {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for n in &render.normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }

        let mut current = None;
        for (tri, &material) in render.indices.chunks_exact(3).zip(&render.materials) {
            if current != Some(material) {
                writeln!(out, "usemtl {}", material.name())?;
                current = Some(material);
            }
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
        Ok(())
    })
    .map_err(|e| ExportError::io(path, e))?;

    info!(
        "Wrote {:?}: {} vertices, {} triangles",
        path,
        render.vertex_count(),
        render.triangle_count()
    );
    Ok(mtl)
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    Ok(BufWriter::new(file))
}

fn write_obj_body(
    out: &mut BufWriter<File>,
    ship: &Spaceship,
    mtl: Option<&Path>,
    body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> std::io::Result<()> {
    writeln!(out, "# Procedural spaceship, seed {:#018x}", ship.seed)?;
    if let Some(name) = mtl.and_then(|p| p.file_name()) {
        writeln!(out, "mtllib {}", name.to_string_lossy())?;
    }
    writeln!(out, "o Spaceship")?;
    body(out)?;
    out.flush()
}

/// Write `<stem>.mtl` next to `obj_path` when a palette is present
fn write_palette(
    palette: Option<&MaterialPalette>,
    obj_path: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(palette) = palette else {
        return Ok(None);
    };

    let path = obj_path.with_extension("mtl");
    let mut out = create(&path)?;
    write_mtl(&mut out, palette).map_err(|e| ExportError::io(&path, e))?;
    Ok(Some(path))
}

fn write_mtl(out: &mut impl Write, palette: &MaterialPalette) -> std::io::Result<()> {
    for slot in MaterialSlot::ALL {
        let appearance = palette.resolve(slot);
        writeln!(out, "newmtl {}", slot.name())?;
        write_appearance(out, appearance)?;
        writeln!(out)?;
    }
    out.flush()
}

fn write_appearance(out: &mut impl Write, a: &Appearance) -> std::io::Result<()> {
    let [r, g, b] = a.base_color;
    writeln!(out, "Kd {r} {g} {b}")?;
    writeln!(out, "Ks {0} {0} {0}", a.specular)?;
    // Blinn-Phong exponent from roughness
    writeln!(out, "Ns {}", (1.0 - a.roughness.clamp(0.0, 1.0)) * 1000.0)?;

    let [r, g, b] = a.emission_color.map(|c| c * a.emission_strength);
    writeln!(out, "Ke {r} {g} {b}")?;

    if let Some(map) = &a.diffuse_map {
        writeln!(out, "map_Kd {map}")?;
    }
    if let Some(map) = &a.emission_map {
        writeln!(out, "map_Ke {map}")?;
    }
    if let Some(map) = &a.normal_map {
        writeln!(out, "norm {map}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::rng::RandomStream;
    use glam::Vec3;

    fn cube_ship(palette: bool) -> Spaceship {
        let mut mesh = Mesh::new();
        mesh.create_cuboid(Vec3::ONE);
        Spaceship {
            seed: 1,
            mesh: mesh.commit(),
            modifiers: Vec::new(),
            palette: palette.then(|| MaterialPalette::generate(&mut RandomStream::from_seed(1))),
            smooth_shading: true,
        }
    }

    #[test]
    fn test_obj_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");

        let mtl = write_obj(&cube_ship(false), &path).unwrap();
        assert!(mtl.is_none());

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("usemtl ")).count(), 1);
        assert!(!text.contains("mtllib"));
    }

    #[test]
    fn test_mtl_written_with_palette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ship.obj");

        let mtl = write_obj(&cube_ship(true), &path).unwrap().unwrap();
        assert_eq!(mtl, dir.path().join("ship.mtl"));

        let obj = std::fs::read_to_string(&path).unwrap();
        assert!(obj.contains("mtllib ship.mtl"));

        let lib = std::fs::read_to_string(&mtl).unwrap();
        for slot in MaterialSlot::ALL {
            assert!(lib.contains(&format!("newmtl {}", slot.name())));
        }
        assert!(lib.contains("map_Ke textures/hull_lights_emit.png"));
    }

    #[test]
    fn test_render_obj_triangles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/render.obj");

        write_render_obj(&cube_ship(false), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 12);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 8);
    }
}
