//! The generated spaceship and its finishing stack

use serde::{Deserialize, Serialize};

use crate::material::MaterialPalette;
use crate::mesh::CommittedMesh;
use crate::render::{Chamfer, FlatNormals, MeshApply, Mirror, MirrorPlane, RenderMesh, SmoothNormals};

/// Bevel width applied by the default finishing stack
pub const BEVEL_WIDTH: f32 = 0.02;
/// Bevel segments applied by the default finishing stack
pub const BEVEL_SEGMENTS: u32 = 2;

/// Non-destructive finishing step applied when building the render mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modifier {
    /// Mirror across the YZ plane (`horizontal`) and/or the XZ plane (`vertical`)
    Mirror { horizontal: bool, vertical: bool },
    /// Chamfer sharp edges
    Bevel { width: f32, segments: u32 },
}

/// Output of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spaceship {
    /// Numeric seed the run was driven by
    pub seed: u64,
    /// Polygon mesh with per-face material slots
    pub mesh: CommittedMesh,
    /// Finishing stack, applied in order by [`Spaceship::to_render_mesh`]
    pub modifiers: Vec<Modifier>,
    /// Appearances for the material slots, if materials were assigned
    pub palette: Option<MaterialPalette>,
    /// Average normals across faces instead of flat shading
    pub smooth_shading: bool,
}

impl Spaceship {
    /// Lowest Z of the unmodified mesh, 0.0 for an empty mesh
    pub fn lowest_z(&self) -> f32 {
        self.mesh.bounds().map_or(0.0, |(min, _)| min.z)
    }

    /// Triangulate the mesh and apply the finishing stack
    pub fn to_render_mesh(&self) -> RenderMesh {
        let mut render = RenderMesh::from_committed(&self.mesh);
        for modifier in &self.modifiers {
            match *modifier {
                Modifier::Mirror {
                    horizontal,
                    vertical,
                } => {
                    if horizontal {
                        render.apply(Mirror::across(MirrorPlane::Yz));
                    }
                    if vertical {
                        render.apply(Mirror::across(MirrorPlane::Xz));
                    }
                }
                Modifier::Bevel { width, segments } => {
                    render.apply(Chamfer {
                        amount: width,
                        segments,
                        ..Chamfer::default()
                    });
                }
            }
        }
        if self.smooth_shading {
            render.apply(SmoothNormals::default());
        } else {
            render.apply(FlatNormals);
        }
        render
    }
}
