//! Triangle mesh for rendering and the modifiers that finish it
//!
//! A [`RenderMesh`] is built from a committed polygon mesh by fan
//! triangulation and then run through modifiers in the order the ship's
//! stack lists them.
//!
//! # Fluent API
//!
//! ```
//! use spaceship::render::*;
//! use spaceship::mesh::Mesh;
//! use glam::Vec3;
//!
//! let mut mesh = Mesh::new();
//! mesh.create_cuboid(Vec3::ONE);
//! let mut render = RenderMesh::from_committed(&mesh.commit());
//! render
//!     .apply(Mirror::across(MirrorPlane::Xz))
//!     .apply(Chamfer::default())
//!     .apply(SmoothNormals::default());
//! ```

use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

use crate::material::MaterialSlot;
use crate::mesh::CommittedMesh;

/// Indexed triangle mesh with per-triangle material slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Three indices per triangle, counter-clockwise from outside
    pub indices: Vec<u32>,
    /// One slot per triangle
    pub materials: Vec<MaterialSlot>,
}

impl RenderMesh {
    /// Fan-triangulate every committed face
    ///
    /// Vertices stay shared between faces, normals start as the area-weighted
    /// average of the adjacent faces. Wire edges are not renderable and are
    /// dropped.
    pub fn from_committed(mesh: &CommittedMesh) -> Self {
        let mut render = Self {
            positions: mesh.positions.clone(),
            normals: vec![Vec3::ZERO; mesh.positions.len()],
            indices: Vec::new(),
            materials: Vec::new(),
        };

        for face in &mesh.faces {
            let Some((&first, rest)) = face.indices.split_first() else {
                continue;
            };
            for pair in rest.windows(2) {
                render.indices.extend_from_slice(&[first, pair[0], pair[1]]);
                render.materials.push(face.material);
            }
        }

        for tri in render.indices.chunks_exact(3) {
            let weighted = render.triangle_cross(tri);
            for &i in tri {
                render.normals[i as usize] += weighted;
            }
        }
        for n in &mut render.normals {
            *n = n.normalize_or_zero();
        }

        render
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unnormalized triangle normal, length twice the triangle area
    fn triangle_cross(&self, tri: &[u32]) -> Vec3 {
        let p0 = self.positions[tri[0] as usize];
        let p1 = self.positions[tri[1] as usize];
        let p2 = self.positions[tri[2] as usize];
        (p1 - p0).cross(p2 - p0)
    }
}

/// Trait for render mesh modifiers
pub trait MeshModifier {
    /// Apply this modifier to a mesh, modifying it in place
    fn apply(&self, mesh: &mut RenderMesh);
}

/// Extension trait for fluent modifier application
pub trait MeshApply {
    /// Apply a modifier and return `&mut Self` for chaining
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self;
}

impl MeshApply for RenderMesh {
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

/// Plane to mirror across
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPlane {
    /// Flips Y
    Xz,
    /// Flips Z
    Xy,
    /// Flips X
    Yz,
}

impl MirrorPlane {
    fn axis(self) -> usize {
        match self {
            MirrorPlane::Yz => 0,
            MirrorPlane::Xz => 1,
            MirrorPlane::Xy => 2,
        }
    }
}

/// Mirror the mesh with vertex welding on the mirror plane
///
/// The mirrored copy has reversed winding so it still faces outward.
pub struct Mirror {
    pub plane: MirrorPlane,
    /// Distance from the plane within which a vertex is welded to its mirror
    pub merge_threshold: f32,
}

impl Mirror {
    pub fn across(plane: MirrorPlane) -> Self {
        Self {
            plane,
            merge_threshold: 0.001,
        }
    }
}

impl MeshModifier for Mirror {
    fn apply(&self, mesh: &mut RenderMesh) {
        let original_vertex_count = mesh.positions.len();
        let axis = self.plane.axis();

        // Mirrored vertex index for every original vertex
        let mut mirrored = Vec::with_capacity(original_vertex_count);
        for i in 0..original_vertex_count {
            if mesh.positions[i][axis].abs() < self.merge_threshold {
                mirrored.push(i as u32);
                continue;
            }
            let mut pos = mesh.positions[i];
            pos[axis] = -pos[axis];
            let mut norm = mesh.normals[i];
            norm[axis] = -norm[axis];
            mirrored.push(mesh.positions.len() as u32);
            mesh.positions.push(pos);
            mesh.normals.push(norm);
        }

        let original_triangle_count = mesh.triangle_count();
        for t in 0..original_triangle_count {
            let base = t * 3;
            let i0 = mirrored[mesh.indices[base] as usize];
            let i1 = mirrored[mesh.indices[base + 1] as usize];
            let i2 = mirrored[mesh.indices[base + 2] as usize];

            // Reverse winding to stay CCW from outside
            mesh.indices.extend_from_slice(&[i2, i1, i0]);
            let material = mesh.materials[t];
            mesh.materials.push(material);
        }
    }
}

/// Recalculate normals by averaging face normals over shared positions
pub struct SmoothNormals {
    /// Vertices closer than this share one normal
    pub weld_threshold: f32,
}

impl Default for SmoothNormals {
    fn default() -> Self {
        Self {
            weld_threshold: 0.0001,
        }
    }
}

impl MeshModifier for SmoothNormals {
    fn apply(&self, mesh: &mut RenderMesh) {
        let cell = self.weld_threshold.max(f32::EPSILON);
        let key = |p: Vec3| {
            let q = (p / cell).round();
            (q.x as i64, q.y as i64, q.z as i64)
        };

        let mut sums: HashMap<(i64, i64, i64), Vec3> = HashMap::new();
        for tri in mesh.indices.chunks_exact(3) {
            let normal = mesh.triangle_cross(tri).normalize_or_zero();
            for &i in tri {
                *sums.entry(key(mesh.positions[i as usize])).or_default() += normal;
            }
        }

        for i in 0..mesh.positions.len() {
            if let Some(sum) = sums.get(&key(mesh.positions[i])) {
                mesh.normals[i] = sum.normalize_or_zero();
            }
        }
    }
}

/// Convert to flat shading by giving every triangle its own vertices
pub struct FlatNormals;

impl MeshModifier for FlatNormals {
    fn apply(&self, mesh: &mut RenderMesh) {
        let mut positions = Vec::with_capacity(mesh.indices.len());
        let mut normals = Vec::with_capacity(mesh.indices.len());
        let mut indices = Vec::with_capacity(mesh.indices.len());

        for tri in mesh.indices.chunks_exact(3) {
            let normal = mesh.triangle_cross(tri).normalize_or_zero();
            for &i in tri {
                indices.push(positions.len() as u32);
                positions.push(mesh.positions[i as usize]);
                normals.push(normal);
            }
        }

        mesh.positions = positions;
        mesh.normals = normals;
        mesh.indices = indices;
    }
}

/// Bevel sharp edges with strips of inset geometry
pub struct Chamfer {
    /// Distance to inset from edges
    pub amount: f32,
    /// Number of bevel segments (1 = flat bevel, 2+ = rounded)
    pub segments: u32,
    /// Minimum angle between faces (degrees) to be considered a sharp edge
    pub angle_threshold_degrees: f32,
}

impl Default for Chamfer {
    fn default() -> Self {
        Self {
            amount: crate::ship::BEVEL_WIDTH,
            segments: crate::ship::BEVEL_SEGMENTS,
            angle_threshold_degrees: 30.0,
        }
    }
}

/// Triangles sharing an undirected edge
struct EdgeInfo {
    triangles: Vec<usize>,
}

impl MeshModifier for Chamfer {
    fn apply(&self, mesh: &mut RenderMesh) {
        if mesh.indices.is_empty() || self.amount <= 0.0 || self.segments == 0 {
            return;
        }

        let angle_threshold = self.angle_threshold_degrees.to_radians().cos();

        // Ordered map keeps the output identical between runs
        let mut edges: BTreeMap<(u32, u32), EdgeInfo> = BTreeMap::new();
        let mut face_normals = Vec::with_capacity(mesh.triangle_count());
        for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
            face_normals.push(mesh.triangle_cross(tri).normalize_or_zero());
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                edges
                    .entry(key)
                    .or_insert_with(|| EdgeInfo {
                        triangles: Vec::new(),
                    })
                    .triangles
                    .push(t);
            }
        }

        let sharp: Vec<((u32, u32), &EdgeInfo)> = edges
            .iter()
            .filter(|(_, e)| match e.triangles.as_slice() {
                [a, b] => face_normals[*a].dot(face_normals[*b]) < angle_threshold,
                [_] => true,
                _ => false,
            })
            .map(|(k, e)| (*k, e))
            .collect();

        let mut positions = mesh.positions.clone();
        let mut normals = mesh.normals.clone();
        let mut indices = mesh.indices.clone();
        let mut materials = mesh.materials.clone();

        for ((v0, v1), edge) in sharp {
            let p0 = mesh.positions[v0 as usize];
            let p1 = mesh.positions[v1 as usize];
            let edge_dir = (p1 - p0).normalize_or_zero();

            let avg_normal = edge
                .triangles
                .iter()
                .map(|&t| face_normals[t])
                .sum::<Vec3>()
                .normalize_or_zero();
            let inset_dir = edge_dir.cross(avg_normal).normalize_or_zero();
            if inset_dir == Vec3::ZERO {
                continue;
            }

            let mut strip0 = vec![v0];
            let mut strip1 = vec![v1];
            for seg in 1..=self.segments {
                let t = seg as f32 / (self.segments + 1) as f32;
                let inset = inset_dir * (self.amount * t) - avg_normal * (self.amount * t * 0.5);

                strip0.push(positions.len() as u32);
                positions.push(p0 + inset);
                normals.push(mesh.normals[v0 as usize]);

                strip1.push(positions.len() as u32);
                positions.push(p1 + inset);
                normals.push(mesh.normals[v1 as usize]);
            }

            let material = mesh.materials[edge.triangles[0]];
            for i in 0..strip0.len() - 1 {
                let (a, b) = (strip0[i], strip0[i + 1]);
                let (c, d) = (strip1[i], strip1[i + 1]);
                indices.extend_from_slice(&[a, c, b, b, c, d]);
                materials.extend_from_slice(&[material, material]);
            }
        }

        mesh.positions = positions;
        mesh.normals = normals;
        mesh.indices = indices;
        mesh.materials = materials;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn cube() -> RenderMesh {
        let mut mesh = Mesh::new();
        mesh.create_cuboid(Vec3::ONE);
        RenderMesh::from_committed(&mesh.commit())
    }

    fn shifted_cube() -> RenderMesh {
        let mut render = cube();
        for p in &mut render.positions {
            *p += Vec3::new(0.0, 2.0, 0.0);
        }
        render
    }

    #[test]
    fn test_from_committed_triangulates_quads() {
        let render = cube();
        assert_eq!(render.vertex_count(), 8);
        assert_eq!(render.triangle_count(), 12);
        assert_eq!(render.materials.len(), 12);
    }

    #[test]
    fn test_mirror_doubles_triangles() {
        let mut render = shifted_cube();
        Mirror::across(MirrorPlane::Xz).apply(&mut render);

        assert_eq!(render.triangle_count(), 24);
        assert_eq!(render.vertex_count(), 16);
        assert!(render.positions[8..].iter().all(|p| p.y < 0.0));
    }

    #[test]
    fn test_mirror_welds_plane_vertices() {
        // Cube centred on the origin has no vertex on the plane, half-cube does
        let mut mesh = Mesh::new();
        mesh.create_cuboid(Vec3::ONE);
        let mut committed = mesh.commit();
        for p in &mut committed.positions {
            p.y = p.y.max(0.0);
        }
        let mut render = RenderMesh::from_committed(&committed);
        Mirror::across(MirrorPlane::Xz).apply(&mut render);
        assert_eq!(render.vertex_count(), 12);
    }

    #[test]
    fn test_mirrored_triangles_face_outward() {
        let mut render = shifted_cube();
        Mirror::across(MirrorPlane::Xy).apply(&mut render);

        let center = Vec3::new(0.0, 2.0, 0.0);
        for tri in render.indices.chunks_exact(3).skip(12) {
            let n = render.triangle_cross(tri);
            let c = (render.positions[tri[0] as usize]
                + render.positions[tri[1] as usize]
                + render.positions[tri[2] as usize])
                / 3.0;
            // Mirrored cube is the same cube, centre unchanged
            assert!(n.dot(c - center) > 0.0);
        }
    }

    #[test]
    fn test_smooth_normals_are_unit() {
        let mut render = cube();
        SmoothNormals::default().apply(&mut render);
        for n in &render.normals {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flat_normals_vertex_count() {
        let mut render = cube();
        FlatNormals.apply(&mut render);

        assert_eq!(render.vertex_count(), 36);
        for tri in render.indices.chunks_exact(3) {
            let n0 = render.normals[tri[0] as usize];
            assert_eq!(n0, render.normals[tri[1] as usize]);
            assert_eq!(n0, render.normals[tri[2] as usize]);
        }
    }

    #[test]
    fn test_chamfer_adds_geometry_on_sharp_edges() {
        let mut render = cube();
        Chamfer::default().apply(&mut render);

        // 12 sharp cube edges, 2 segments: 2 quads (4 triangles) per edge
        assert_eq!(render.triangle_count(), 12 + 12 * 4);
        assert_eq!(render.materials.len(), render.triangle_count());
    }

    #[test]
    fn test_chamfer_skips_flat_diagonals() {
        let mut render = cube();
        let before = render.triangle_count();
        Chamfer {
            amount: 0.05,
            segments: 1,
            angle_threshold_degrees: 120.0,
        }
        .apply(&mut render);
        // No cube edge is sharper than 120 degrees
        assert_eq!(render.triangle_count(), before);
    }

    #[test]
    fn test_fluent_apply_chaining() {
        let mut render = shifted_cube();
        let tris = render
            .apply(Mirror::across(MirrorPlane::Xz))
            .apply(SmoothNormals::default())
            .triangle_count();
        assert_eq!(tris, 24);
    }
}
