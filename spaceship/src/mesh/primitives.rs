//! Primitive shapes added directly into a [`Mesh`]
//!
//! Every creator takes a local-to-world matrix and builds its shape around
//! the local origin with the local Z axis as the shape's axis, so callers
//! place primitives with a face frame.

use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use tracing::warn;

use super::{Geometry, Mesh, VertexId};
use crate::material::MaterialSlot;

impl Mesh {
    /// Axis-aligned box centred on the origin
    ///
    /// Faces are created in the order -X, +X, -Y, +Y, -Z, +Z. On both X faces
    /// the first edge runs along Z and the last vertex lies along +Y from the
    /// first, so a face frame built on them has local Y equal to world Y.
    pub fn create_cuboid(&mut self, size: Vec3) -> Geometry {
        let h = size * 0.5;
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);

        let vertices: Vec<VertexId> = (0..8)
            .map(|i| {
                let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
                let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
                let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
                self.add_vertex(corner(sx, sy, sz))
            })
            .collect();

        // Corner index = x | y << 1 | z << 2
        const LOOPS: [[usize; 4]; 6] = [
            [0, 4, 6, 2], // -X
            [5, 1, 3, 7], // +X
            [0, 1, 5, 4], // -Y
            [2, 6, 7, 3], // +Y
            [0, 2, 3, 1], // -Z
            [4, 5, 7, 6], // +Z
        ];

        let faces = LOOPS
            .iter()
            .map(|l| {
                self.add_face(l.iter().map(|&i| vertices[i]).collect(), MaterialSlot::Hull)
            })
            .collect();

        Geometry {
            vertices,
            edges: Vec::new(),
            faces,
        }
    }

    /// Cylinder or cone along local Z, centred on the local origin
    ///
    /// A radius of zero collapses that end to a single apex vertex. With
    /// `cap_ends`, each non-collapsed end is closed by one n-gon.
    pub fn create_cone(
        &mut self,
        segments: u32,
        radius_bottom: f32,
        radius_top: f32,
        depth: f32,
        cap_ends: bool,
        matrix: Mat4,
    ) -> Geometry {
        let radius_bottom = if radius_bottom < 0.0 {
            warn!("create_cone: radius_bottom must be >= 0.0, clamping to 0.0");
            0.0
        } else {
            radius_bottom
        };

        let radius_top = if radius_top < 0.0 {
            warn!("create_cone: radius_top must be >= 0.0, clamping to 0.0");
            0.0
        } else {
            radius_top
        };

        let depth = if depth <= 0.0 {
            warn!("create_cone: depth must be > 0.0, clamping to 0.001");
            0.001
        } else {
            depth
        };

        let segments = segments.clamp(3, 256) as usize;
        let half = depth * 0.5;
        let mut geom = Geometry::default();

        let ring = |mesh: &mut Mesh, radius: f32, z: f32, geom: &mut Geometry| -> Vec<VertexId> {
            if radius == 0.0 {
                let apex = mesh.add_vertex(matrix.transform_point3(Vec3::new(0.0, 0.0, z)));
                geom.vertices.push(apex);
                return vec![apex; segments];
            }
            (0..segments)
                .map(|i| {
                    let theta = i as f32 / segments as f32 * TAU;
                    let local = Vec3::new(radius * theta.cos(), radius * theta.sin(), z);
                    let v = mesh.add_vertex(matrix.transform_point3(local));
                    geom.vertices.push(v);
                    v
                })
                .collect()
        };

        let bottom = ring(self, radius_bottom, -half, &mut geom);
        let top = ring(self, radius_top, half, &mut geom);

        for i in 0..segments {
            let j = (i + 1) % segments;
            let mut side = vec![bottom[i], bottom[j], top[j], top[i]];
            side.dedup();
            if side.len() >= 3 {
                geom.faces.push(self.add_face(side, MaterialSlot::Hull));
            }
        }

        if cap_ends {
            if radius_bottom > 0.0 {
                let cap = bottom.iter().rev().copied().collect();
                geom.faces.push(self.add_face(cap, MaterialSlot::Hull));
            }
            if radius_top > 0.0 {
                geom.faces.push(self.add_face(top, MaterialSlot::Hull));
            }
        }

        geom
    }

    /// UV sphere centred on the local origin, poles on local Z
    pub fn create_uv_sphere(
        &mut self,
        u_segments: u32,
        v_segments: u32,
        radius: f32,
        matrix: Mat4,
    ) -> Geometry {
        let radius = if radius <= 0.0 {
            warn!("create_uv_sphere: radius must be > 0.0, clamping to 0.001");
            0.001
        } else {
            radius
        };

        let u_segments = u_segments.clamp(3, 256) as usize;
        let v_segments = v_segments.clamp(2, 256) as usize;
        let mut geom = Geometry::default();

        let mut point = |mesh: &mut Mesh, local: Vec3| {
            let v = mesh.add_vertex(matrix.transform_point3(local));
            geom.vertices.push(v);
            v
        };

        let north = point(self, Vec3::new(0.0, 0.0, radius));
        let rings: Vec<Vec<VertexId>> = (1..v_segments)
            .map(|k| {
                let phi = k as f32 / v_segments as f32 * PI;
                let (ring_radius, z) = (radius * phi.sin(), radius * phi.cos());
                (0..u_segments)
                    .map(|i| {
                        let theta = i as f32 / u_segments as f32 * TAU;
                        point(
                            self,
                            Vec3::new(ring_radius * theta.cos(), ring_radius * theta.sin(), z),
                        )
                    })
                    .collect()
            })
            .collect();
        let south = point(self, Vec3::new(0.0, 0.0, -radius));

        let mut faces = Vec::new();
        for i in 0..u_segments {
            let j = (i + 1) % u_segments;
            faces.push(vec![north, rings[0][i], rings[0][j]]);
            for pair in rings.windows(2) {
                let (upper, lower) = (&pair[0], &pair[1]);
                faces.push(vec![upper[i], lower[i], lower[j], upper[j]]);
            }
            let last = &rings[rings.len() - 1];
            faces.push(vec![south, last[j], last[i]]);
        }
        for f in faces {
            geom.faces.push(self.add_face(f, MaterialSlot::Hull));
        }

        geom
    }

    /// Circle in the local XY plane
    ///
    /// Without `cap_ends` the ring is only wire edges; with it the ring is
    /// also closed by a single n-gon facing local +Z.
    pub fn create_circle(
        &mut self,
        segments: u32,
        radius: f32,
        cap_ends: bool,
        matrix: Mat4,
    ) -> Geometry {
        let radius = if radius <= 0.0 {
            warn!("create_circle: radius must be > 0.0, clamping to 0.001");
            0.001
        } else {
            radius
        };

        let segments = segments.clamp(3, 256) as usize;
        let mut geom = Geometry::default();

        for i in 0..segments {
            let theta = i as f32 / segments as f32 * TAU;
            let local = Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
            geom.vertices.push(self.add_vertex(matrix.transform_point3(local)));
        }
        for i in 0..segments {
            let edge = self.add_edge(geom.vertices[i], geom.vertices[(i + 1) % segments]);
            geom.edges.push(edge);
        }
        if cap_ends {
            geom.faces
                .push(self.add_face(geom.vertices.clone(), MaterialSlot::Hull));
        }

        geom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward(mesh: &Mesh, geom: &Geometry, center: Vec3) -> bool {
        geom.faces.iter().all(|&f| {
            let n = mesh.face_normal(f).unwrap();
            let c = mesh.face_center(f).unwrap();
            n.dot(c - center) > 0.0
        })
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mut mesh = Mesh::new();
        let cube = mesh.create_cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.faces.len(), 6);
        assert!(outward(&mesh, &cube, Vec3::ZERO));

        let expected = [Vec3::NEG_X, Vec3::X, Vec3::NEG_Y, Vec3::Y, Vec3::NEG_Z, Vec3::Z];
        for (face, normal) in cube.faces.iter().zip(expected) {
            assert!(mesh.face_normal(*face).unwrap().distance(normal) < 1e-6);
        }
    }

    #[test]
    fn test_cylinder_counts_and_orientation() {
        let mut mesh = Mesh::new();
        let matrix = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let geom = mesh.create_cone(8, 1.0, 1.0, 2.0, true, matrix);

        assert_eq!(geom.vertices.len(), 16);
        assert_eq!(geom.faces.len(), 8 + 2);
        assert!(outward(&mesh, &geom, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_cone_collapses_to_apex() {
        let mut mesh = Mesh::new();
        let geom = mesh.create_cone(8, 0.5, 0.0, 1.0, true, Mat4::IDENTITY);

        assert_eq!(geom.vertices.len(), 9);
        // 8 triangles + bottom cap
        assert_eq!(geom.faces.len(), 9);
        assert!(outward(&mesh, &geom, Vec3::ZERO));
    }

    #[test]
    fn test_uv_sphere_is_closed_and_outward() {
        let mut mesh = Mesh::new();
        let geom = mesh.create_uv_sphere(8, 8, 1.0, Mat4::IDENTITY);

        assert_eq!(geom.vertices.len(), 2 + 7 * 8);
        assert_eq!(geom.faces.len(), 8 * 8);
        assert!(outward(&mesh, &geom, Vec3::ZERO));
    }

    #[test]
    fn test_open_circle_is_wire_only() {
        let mut mesh = Mesh::new();
        let geom = mesh.create_circle(32, 0.5, false, Mat4::IDENTITY);

        assert_eq!(geom.edges.len(), 32);
        assert!(geom.faces.is_empty());
        assert_eq!(mesh.wires().len(), 32);
    }

    #[test]
    fn test_invalid_params_are_clamped() {
        let mut mesh = Mesh::new();
        let geom = mesh.create_cone(1, -1.0, 1.0, -2.0, false, Mat4::IDENTITY);
        // Clamped to 3 segments, bottom collapsed to an apex
        assert_eq!(geom.faces.len(), 3);
    }
}
