//! Procedural spaceship generation
//!
//! Ships are grown from a stretched box: the front and back faces are
//! extruded into a hull, a few faces sprout asymmetric protrusions, and the
//! remaining faces are decorated with engines, panel grids, turrets,
//! antennas, spheres and glowing discs. Every decision draws from one seeded
//! [`RandomStream`], so a seed string and a [`GenerationConfig`] reproduce the
//! same ship.
//!
//! # Example
//! ```no_run
//! use spaceship::*;
//! use std::path::Path;
//!
//! let ship = generate(&GenerationConfig::default(), Some("abc"))?;
//! println!("{} faces", ship.mesh.face_count());
//!
//! // Polygon mesh with material groups, plus ship.mtl
//! write_obj(&ship, Path::new("ship.obj"))?;
//!
//! // Mirrored, bevelled, smooth-shaded triangles
//! write_render_obj(&ship, Path::new("ship_render.obj"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod detail;
pub mod error;
pub mod export;
pub mod geometry;
pub mod hull;
pub mod material;
pub mod mesh;
pub mod movie;
pub mod render;
pub mod rng;
pub mod ship;
pub mod transform;

pub use config::{GenerationConfig, SegmentRange, ShipManifest};
pub use error::{ConfigError, ExportError, GenerateError, MeshError, MovieError};
pub use export::{write_obj, write_render_obj};
pub use hull::{generate, generate_with};
pub use material::{Appearance, MaterialPalette, MaterialSlot};
pub use mesh::{CommittedMesh, FaceId, Mesh, VertexId};
pub use movie::{MovieConfig, MoviePlan, plan_movie, render_movie};
pub use render::RenderMesh;
pub use rng::RandomStream;
pub use ship::{Modifier, Spaceship};
