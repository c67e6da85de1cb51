//! Topology and vertex operations on [`Mesh`]

use glam::{Mat4, Quat, Vec3};

use super::{Edge, Extrusion, FaceId, Geometry, Mesh, VertexId};
use crate::error::MeshError;
use crate::rng::RandomStream;

impl Mesh {
    /// Extrude a single face without moving it
    ///
    /// The face's boundary is duplicated into a new cap face with the same
    /// winding and material, and each boundary edge is joined to its copy by
    /// a quad. The original face is retired. The cap starts coplanar with the
    /// original; callers translate it afterwards.
    pub fn extrude_discrete(&mut self, face: FaceId) -> Result<Extrusion, MeshError> {
        let record = self.record(face)?;
        let base = record.verts.clone();
        let material = record.material;

        let top: Vec<VertexId> = base
            .iter()
            .map(|&v| self.add_vertex(self.position(v)))
            .collect();

        let n = base.len();
        let mut sides = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            sides.push(self.add_face(vec![base[i], base[j], top[j], top[i]], material));
        }

        self.retire(face)?;
        let cap = self.add_face(top, material);
        Ok(Extrusion { cap, sides })
    }

    /// Offset a set of vertices
    pub fn translate(&mut self, verts: &[VertexId], offset: Vec3) {
        for &v in verts {
            self.positions[v.index()] += offset;
        }
    }

    /// Offset every vertex of a face
    pub fn translate_face(&mut self, face: FaceId, offset: Vec3) -> Result<(), MeshError> {
        let verts = self.record(face)?.verts.clone();
        self.translate(&verts, offset);
        Ok(())
    }

    /// Rotate a set of vertices about `center`
    pub fn rotate_about(&mut self, verts: &[VertexId], center: Vec3, rotation: Quat) {
        for &v in verts {
            let p = &mut self.positions[v.index()];
            *p = center + rotation * (*p - center);
        }
    }

    /// Apply an affine transform to a set of vertices
    pub fn transform(&mut self, verts: &[VertexId], matrix: Mat4) {
        for &v in verts {
            let p = &mut self.positions[v.index()];
            *p = matrix.transform_point3(*p);
        }
    }

    /// Scale vertices along the axes of a local space
    ///
    /// `space` maps local coordinates to world coordinates. Vertices are taken
    /// into that space, scaled per axis about its origin, and brought back.
    pub fn scale_in_frame(&mut self, verts: &[VertexId], space: Mat4, scale: Vec3) {
        let matrix = space * Mat4::from_scale(scale) * space.inverse();
        self.transform(verts, matrix);
    }

    /// Subdivide a quad into a `(cuts + 1) x (cuts + 1)` grid
    ///
    /// New boundary vertices are spliced into every live neighbour sharing
    /// the split edge, so the surface stays closed. With `fractal > 0` each
    /// new vertex is jittered along the face normal by up to
    /// `fractal * mean edge length / 2`, drawing from `rng` in row-major
    /// order.
    ///
    /// Faces that are not quads, and `cuts == 0`, are left untouched and
    /// returned as the only face of the result.
    pub fn subdivide_grid(
        &mut self,
        face: FaceId,
        cuts: u32,
        fractal: f32,
        rng: &mut RandomStream,
    ) -> Result<Geometry, MeshError> {
        let record = self.record(face)?;
        if cuts == 0 || record.verts.len() != 4 {
            return Ok(Geometry {
                faces: vec![face],
                ..Geometry::default()
            });
        }
        let corners = [record.verts[0], record.verts[1], record.verts[2], record.verts[3]];
        let material = record.material;

        let normal = self.face_normal(face)?;
        let lengths = self.edge_lengths(face)?;
        let jitter = fractal * lengths.iter().sum::<f32>() / lengths.len() as f32;
        let [p0, p1, p2, p3] = corners.map(|v| self.position(v));

        // Bilinear grid; u runs v0 -> v1, w runs v0 -> v3
        let steps = cuts as usize + 1;
        let mut grid = vec![vec![VertexId(0); steps + 1]; steps + 1];
        let mut created = Geometry::default();
        for row in 0..=steps {
            for col in 0..=steps {
                let corner = match (row, col) {
                    (0, 0) => Some(corners[0]),
                    (0, c) if c == steps => Some(corners[1]),
                    (r, c) if r == steps && c == steps => Some(corners[2]),
                    (r, 0) if r == steps => Some(corners[3]),
                    _ => None,
                };
                grid[row][col] = match corner {
                    Some(v) => v,
                    None => {
                        let u = col as f32 / steps as f32;
                        let w = row as f32 / steps as f32;
                        let near = p0.lerp(p1, u);
                        let far = p3.lerp(p2, u);
                        let mut p = near.lerp(far, w);
                        if jitter > 0.0 {
                            p += normal * (jitter * (rng.unit() - 0.5));
                        }
                        let v = self.add_vertex(p);
                        created.vertices.push(v);
                        v
                    }
                };
            }
        }

        // Boundary runs between corners, in the face's winding direction
        let bottom: Vec<VertexId> = (0..=steps).map(|c| grid[0][c]).collect();
        let right: Vec<VertexId> = (0..=steps).map(|r| grid[r][steps]).collect();
        let top: Vec<VertexId> = (0..=steps).rev().map(|c| grid[steps][c]).collect();
        let left: Vec<VertexId> = (0..=steps).rev().map(|r| grid[r][0]).collect();
        for run in [&bottom, &right, &top, &left] {
            self.splice_edge(face, run)?;
            created
                .edges
                .extend(run.windows(2).map(|pair| Edge(pair[0], pair[1])));
        }

        self.retire(face)?;
        for row in 0..steps {
            for col in 0..steps {
                let cell = vec![
                    grid[row][col],
                    grid[row][col + 1],
                    grid[row + 1][col + 1],
                    grid[row + 1][col],
                ];
                created.faces.push(self.add_face(cell, material));
            }
        }

        Ok(created)
    }

    /// Insert the interior of `run` into live neighbours of `face` that share
    /// the edge `run.first() -> run.last()`
    fn splice_edge(&mut self, face: FaceId, run: &[VertexId]) -> Result<(), MeshError> {
        let (Some(&a), Some(&b)) = (run.first(), run.last()) else {
            return Ok(());
        };
        let inner = &run[1..run.len() - 1];
        if inner.is_empty() {
            return Ok(());
        }

        for (index, other) in self.faces.iter_mut().enumerate() {
            if other.retired || index == face.index() {
                continue;
            }
            let n = other.verts.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let (x, y) = (other.verts[i], other.verts[j]);
                // A consistently wound neighbour walks the shared edge backwards
                let insert: Option<Vec<VertexId>> = if x == b && y == a {
                    Some(inner.iter().rev().copied().collect())
                } else if x == a && y == b {
                    Some(inner.to_vec())
                } else {
                    None
                };
                if let Some(insert) = insert {
                    let at = i + 1;
                    other.verts.splice(at..at, insert);
                    break;
                }
            }
        }
        Ok(())
    }
}
