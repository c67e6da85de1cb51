//! Hull growth engine
//!
//! A ship is grown from a stretched box in four passes, all driven by one
//! [`RandomStream`]:
//!
//! 1. **Base shape**: a unit cube scaled by a random factor per axis.
//! 2. **Hull growth**: the front and back faces are extruded segment by
//!    segment, with occasional ribbed segments, cross-section scaling,
//!    sideways nudges and small rolls.
//! 3. **Asymmetry**: a few faces sprout short chains of shrinking extrusions.
//! 4. **Detail**: faces are classified into detailer buckets by normal and a
//!    random draw, then each bucket is detailed in a fixed order.
//!
//! The draw order of every pass is part of the output: a seed reproduces the
//! same ship only while the passes consume the stream in the same sequence.

use glam::Vec3;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::detail::{add_antenna, add_cylinders, add_disc, add_exhaust, add_grid, add_sphere, add_weapons};
use crate::error::{GenerateError, MeshError};
use crate::geometry::{aspect_ratio, is_rear_face};
use crate::material::{MaterialPalette, MaterialSlot};
use crate::mesh::{FaceId, Mesh};
use crate::rng::RandomStream;
use crate::ship::{BEVEL_SEGMENTS, BEVEL_WIDTH, Modifier, Spaceship};
use crate::transform::{extrude_face, ribbed_extrude_face, rotate_face, scale_face};

/// Faces stretched further than this are left out of the asymmetry pass
const ASYMMETRY_MAX_ASPECT: f32 = 4.0;
/// Faces stretched further than this are not detailed
const DETAIL_MAX_ASPECT: f32 = 3.0;
/// Roll applied to a hull segment, in degrees
const SEGMENT_ROLL_DEGREES: f32 = 5.0;

/// Generate a ship from a config and an optional seed string
///
/// The config is validated before anything is built. Without a seed a fresh
/// one is drawn and logged, so the run can be repeated.
pub fn generate(config: &GenerationConfig, seed: Option<&str>) -> Result<Spaceship, GenerateError> {
    config.validate()?;
    let mut rng = RandomStream::from_optional_seed(seed);
    info!("Generating spaceship with seed {:#018x}", rng.seed());
    generate_with(config, &mut rng)
}

/// Generate a ship drawing from an existing stream
///
/// Used when several ships share one stream, as the movie driver does.
pub fn generate_with(config: &GenerationConfig, rng: &mut RandomStream) -> Result<Spaceship, GenerateError> {
    config.validate()?;

    let mut mesh = Mesh::new();
    let scale = base_shape(&mut mesh, rng);
    grow_hull(&mut mesh, config, scale, rng)?;
    debug!("Hull grown: {} faces", mesh.face_count());

    if config.asymmetry {
        grow_asymmetry(&mut mesh, config, rng)?;
        debug!("Asymmetry grown: {} faces", mesh.face_count());
    }

    if config.detail {
        let buckets = classify(&mut mesh, rng)?;
        buckets.apply(&mut mesh, rng)?;
        debug!("Detail added: {} faces", mesh.face_count());
    }

    let committed = mesh.commit();
    info!(
        "Spaceship committed: {} vertices, {} faces",
        committed.vertex_count(),
        committed.face_count()
    );

    let mut modifiers = Vec::new();
    if config.mirror_horizontal || config.mirror_vertical {
        modifiers.push(Modifier::Mirror {
            horizontal: config.mirror_horizontal,
            vertical: config.mirror_vertical,
        });
    }
    if config.bevel {
        modifiers.push(Modifier::Bevel {
            width: BEVEL_WIDTH,
            segments: BEVEL_SEGMENTS,
        });
    }

    let palette = config.assign_materials.then(|| MaterialPalette::generate(rng));

    Ok(Spaceship {
        seed: rng.seed(),
        mesh: committed,
        modifiers,
        palette,
        smooth_shading: true,
    })
}

/// Build the stretched box the hull grows from, returning its scale
fn base_shape(mesh: &mut Mesh, rng: &mut RandomStream) -> Vec3 {
    let scale = Vec3::new(
        rng.uniform(0.75, 2.0),
        rng.uniform(0.75, 2.0),
        rng.uniform(0.75, 2.0),
    );
    mesh.create_cuboid(scale);
    scale
}

fn grow_hull(
    mesh: &mut Mesh,
    config: &GenerationConfig,
    scale: Vec3,
    rng: &mut RandomStream,
) -> Result<(), MeshError> {
    for start in mesh.live_faces() {
        if mesh.face_normal(start)?.x.abs() <= 0.5 {
            continue;
        }

        let length = rng.uniform(0.3, 1.0);
        let segments = rng.count(config.hull_segments.min, config.hull_segments.max);
        let mut face = start;
        for i in 0..segments {
            let last = i + 1 == segments;
            if rng.chance_above(0.1) {
                face = smooth_segment(mesh, face, length, scale, last, rng)?;
            } else {
                let rib_scale = rng.uniform(0.75, 0.95);
                let ribs = rng.count(2, 4);
                face = ribbed_extrude_face(mesh, face, length, ribs, rib_scale)?;
            }
        }
    }
    Ok(())
}

fn smooth_segment(
    mesh: &mut Mesh,
    face: FaceId,
    length: f32,
    scale: Vec3,
    last: bool,
    rng: &mut RandomStream,
) -> Result<FaceId, MeshError> {
    let mut face = extrude_face(mesh, face, length, None)?;
    if rng.chance_above(0.75) {
        face = extrude_face(mesh, face, length * 0.25, None)?;
    }

    if rng.chance_above(0.5) {
        let mut sy = rng.uniform(1.2, 1.5);
        let mut sz = rng.uniform(1.2, 1.5);
        // The last segment always tapers; the draw is skipped for it
        if last || rng.chance_above(0.5) {
            sy = 1.0 / sy;
            sz = 1.0 / sz;
        }
        // On a front or back face local X runs along world Z
        scale_face(mesh, face, sz, sy, 1.0)?;
    }

    if rng.chance_above(0.5) {
        let offset = rng.uniform(0.1, 0.4) * scale.z * length;
        let offset = offset * rng.sign();
        mesh.translate_face(face, Vec3::new(0.0, 0.0, offset))?;
    }

    if rng.chance_above(0.5) {
        let angle = SEGMENT_ROLL_DEGREES * rng.sign();
        rotate_face(mesh, face, Vec3::Y, angle.to_radians())?;
    }

    Ok(face)
}

fn grow_asymmetry(mesh: &mut Mesh, config: &GenerationConfig, rng: &mut RandomStream) -> Result<(), MeshError> {
    let mut grown = 0;
    for start in mesh.live_faces() {
        if !mesh.is_valid(start) || aspect_ratio(mesh, start) > ASYMMETRY_MAX_ASPECT {
            continue;
        }
        if !rng.chance_above(0.85) {
            continue;
        }

        let length = rng.uniform(0.1, 0.4);
        let pieces = rng.count(config.asymmetry_segments.min, config.asymmetry_segments.max);
        let mut face = start;
        for _ in 0..pieces {
            face = extrude_face(mesh, face, length, None)?;
            if rng.chance_above(0.25) {
                let s = 1.0 / rng.uniform(1.1, 1.5);
                scale_face(mesh, face, s, s, s)?;
            }
        }
        grown += 1;
    }
    debug!("Asymmetry pass grew {grown} protrusions");
    Ok(())
}

/// Faces sorted into detailer buckets
#[derive(Debug, Default)]
struct DetailBuckets {
    engine: Vec<FaceId>,
    grid: Vec<FaceId>,
    antenna: Vec<FaceId>,
    weapon: Vec<FaceId>,
    sphere: Vec<FaceId>,
    disc: Vec<FaceId>,
    cylinder: Vec<FaceId>,
}

/// Sort every detailable face into at most one bucket
///
/// The first rear face always becomes an engine, whatever its draw. Later
/// rear faces only become engines on a high draw.
fn classify(mesh: &mut Mesh, rng: &mut RandomStream) -> Result<DetailBuckets, MeshError> {
    let mut buckets = DetailBuckets::default();

    for face in mesh.live_faces() {
        if aspect_ratio(mesh, face) > DETAIL_MAX_ASPECT {
            continue;
        }

        let val = rng.unit();
        let normal = mesh.face_normal(face)?;
        let outward = normal.dot(mesh.face_center_bounds(face)?) > 0.0;

        if is_rear_face(mesh, face)? {
            if buckets.engine.is_empty() || val > 0.75 {
                buckets.engine.push(face);
            } else if val > 0.5 {
                buckets.cylinder.push(face);
            } else if val > 0.25 {
                buckets.grid.push(face);
            } else {
                mesh.set_material(face, MaterialSlot::HullLights)?;
            }
        } else if normal.x > 0.9 {
            if outward && val > 0.7 {
                buckets.antenna.push(face);
                mesh.set_material(face, MaterialSlot::HullLights)?;
            } else if val > 0.4 {
                buckets.grid.push(face);
            } else {
                mesh.set_material(face, MaterialSlot::HullLights)?;
            }
        } else if normal.z > 0.9 {
            if outward && val > 0.7 {
                buckets.antenna.push(face);
                mesh.set_material(face, MaterialSlot::HullLights)?;
            } else if val > 0.6 {
                buckets.grid.push(face);
            } else if val > 0.3 {
                buckets.cylinder.push(face);
            }
        } else if normal.z < -0.9 {
            if val > 0.75 {
                buckets.disc.push(face);
            } else if val > 0.5 {
                buckets.grid.push(face);
            } else if val > 0.25 {
                buckets.weapon.push(face);
            }
        } else if val > 0.9 {
            buckets.sphere.push(face);
        } else if val > 0.6 {
            buckets.grid.push(face);
        } else if val > 0.3 {
            buckets.cylinder.push(face);
        }
    }

    debug!(
        "Classified faces: {} engine, {} grid, {} antenna, {} weapon, {} sphere, {} disc, {} cylinder",
        buckets.engine.len(),
        buckets.grid.len(),
        buckets.antenna.len(),
        buckets.weapon.len(),
        buckets.sphere.len(),
        buckets.disc.len(),
        buckets.cylinder.len()
    );
    Ok(buckets)
}

impl DetailBuckets {
    /// Run the detailers bucket by bucket
    fn apply(self, mesh: &mut Mesh, rng: &mut RandomStream) -> Result<(), MeshError> {
        for face in self.engine {
            add_exhaust(mesh, face, rng)?;
        }
        for face in self.grid {
            add_grid(mesh, face, rng)?;
        }
        for face in self.antenna {
            add_antenna(mesh, face, rng)?;
        }
        for face in self.weapon {
            add_weapons(mesh, face, rng)?;
        }
        for face in self.sphere {
            add_sphere(mesh, face, rng)?;
        }
        for face in self.disc {
            if mesh.is_valid(face) {
                mesh.set_material(face, MaterialSlot::GlowDisc)?;
            }
            add_disc(mesh, face, rng)?;
        }
        for face in self.cylinder {
            add_cylinders(mesh, face, rng)?;
        }
        Ok(())
    }
}
