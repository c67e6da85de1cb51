//! Fly-by movie planning
//!
//! A movie is a sequence of frames at a fixed rate. A camera on a pole orbits
//! the origin, bobbing between two pitch angles, and a new ship is generated
//! every `ship_duration` seconds (and on the first frame). Planning is pure;
//! [`render_movie`] drives generation and writes one OBJ per ship plus a JSON
//! camera track naming the image of every frame.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GenerationConfig;
use crate::error::{ConfigError, ExportError, MovieError};
use crate::export::write_obj;
use crate::hull::generate_with;
use crate::rng::RandomStream;

/// Distance between the ship's lowest point and the floor plane
pub const FLOOR_GAP: f32 = 0.3;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Movie timing and camera rig parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieConfig {
    /// Frames per second
    pub fps: u32,
    /// Total movie length in seconds
    pub duration: f32,
    /// Seconds each ship stays on screen
    pub ship_duration: f32,

    /// Camera distance from the origin
    pub pole_length: f32,
    /// Lowest pole pitch, degrees
    pub pitch_min: f32,
    /// Highest pole pitch, degrees
    pub pitch_max: f32,
    /// Added to the camera's tilt, degrees
    pub pitch_offset: f32,
    /// Angular rate of the pitch bob, radians per second
    pub pole_rate: f32,
    /// Orbit rate, degrees per second
    pub yaw_rate: f32,
    /// Orbit start angle, degrees
    pub yaw_offset: f32,
    /// Camera field of view, degrees
    pub fov: f32,
    /// Output image size in pixels
    pub resolution: [u32; 2],
}

impl Default for MovieConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            duration: 10.0,
            ship_duration: 5.0,
            pole_length: 10.0,
            pitch_min: 5.0,
            pitch_max: 50.0,
            pitch_offset: 0.0,
            pole_rate: 2.0,
            yaw_rate: 45.0,
            yaw_offset: 0.0,
            fov: 50.0,
            resolution: [1920, 1080],
        }
    }
}

impl MovieConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fps", self.fps as f32)?;
        positive("duration", self.duration)?;
        positive("ship_duration", self.ship_duration)?;
        positive("pole_length", self.pole_length)?;
        positive("fov", self.fov)?;
        Ok(())
    }

    /// Frames rendered per ship, possibly fractional
    fn frames_per_ship(&self) -> f32 {
        self.fps as f32 * self.ship_duration
    }

    /// Camera placement `time` seconds into the movie
    pub fn camera_at(&self, time: f32) -> CameraPose {
        let yaw = (self.yaw_offset + self.yaw_rate * time).to_radians();
        let lerp = 0.5 * (1.0 + (self.pole_rate * time).cos());
        let pitch = self.pitch_max * lerp + self.pitch_min * (1.0 - lerp);

        CameraPose {
            rotation: Vec3::new((90.0 - pitch + self.pitch_offset).to_radians(), 0.0, yaw),
            location: Vec3::new(
                yaw.sin() * self.pole_length,
                -yaw.cos() * self.pole_length,
                pitch.to_radians().sin() * self.pole_length,
            ),
            pitch_degrees: pitch,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

/// Camera placement for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// XYZ Euler rotation in radians
    pub rotation: Vec3,
    pub location: Vec3,
    pub pitch_degrees: f32,
}

/// One planned frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePlan {
    pub index: u32,
    /// Movie time after this frame's step, seconds
    pub time: f32,
    /// Generate a new ship before this frame
    pub regenerate: bool,
    pub camera: CameraPose,
    /// Image path relative to the output directory
    pub image: PathBuf,
}

/// Every frame of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePlan {
    /// `YYYYmmdd_HHMMSS` stamp naming the render folder
    pub timestamp: String,
    pub frames: Vec<FramePlan>,
}

impl MoviePlan {
    /// Plan a movie started at `started`
    pub fn new(config: &MovieConfig, started: NaiveDateTime) -> Result<Self, ConfigError> {
        config.validate()?;

        let timestamp = started.format(TIMESTAMP_FORMAT).to_string();
        let fps = config.fps as f32;
        let per_ship = config.frames_per_ship();

        let mut frames = Vec::new();
        let mut index = 0u32;
        while (index as f32 / fps) < config.duration {
            let time = (index + 1) as f32 / fps;
            let regenerate =
                index == 0 || ((index + 1) as f32 / per_ship).floor() > (index as f32 / per_ship).floor();
            frames.push(FramePlan {
                index,
                time,
                regenerate,
                camera: config.camera_at(time),
                image: frame_path(&timestamp, index),
            });
            index += 1;
        }

        Ok(Self { timestamp, frames })
    }

    /// Directory holding this movie's frames, relative to the output root
    pub fn directory(&self) -> PathBuf {
        Path::new("renders").join(&self.timestamp)
    }

    pub fn ship_count(&self) -> usize {
        self.frames.iter().filter(|f| f.regenerate).count()
    }
}

/// Plan a movie starting now, stamped with local time
pub fn plan_movie(config: &MovieConfig) -> Result<MoviePlan, ConfigError> {
    MoviePlan::new(config, chrono::Local::now().naive_local())
}

/// `renders/<stamp>/<stamp>_<frame:05>.png`
pub fn frame_path(timestamp: &str, frame: u32) -> PathBuf {
    Path::new("renders")
        .join(timestamp)
        .join(format!("{timestamp}_{frame:05}.png"))
}

/// Per-frame record of the camera track file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub frame: u32,
    pub time: f32,
    /// Index of the ship on screen
    pub ship: usize,
    /// Height of the floor plane under that ship
    pub floor_z: f32,
    pub camera: CameraPose,
    pub image: PathBuf,
}

/// Contents of `<stamp>_camera.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTrack {
    pub fps: u32,
    pub fov: f32,
    pub resolution: [u32; 2],
    /// Ship meshes, relative to the output directory
    pub ships: Vec<PathBuf>,
    pub frames: Vec<TrackFrame>,
}

/// What a movie run wrote
#[derive(Debug, Clone)]
pub struct MovieOutput {
    pub directory: PathBuf,
    pub ships: Vec<PathBuf>,
    pub track: PathBuf,
}

/// Generate every ship of `plan` and write meshes plus the camera track
///
/// All ships draw from one stream seeded once, so a seed reproduces the whole
/// movie.
pub fn render_movie(
    plan: &MoviePlan,
    movie: &MovieConfig,
    generation: &GenerationConfig,
    seed: Option<&str>,
    out_dir: &Path,
) -> Result<MovieOutput, MovieError> {
    movie.validate()?;
    generation.validate().map_err(crate::error::GenerateError::from)?;

    let mut rng = RandomStream::from_optional_seed(seed);
    info!(
        "Rendering {} frames ({} ships) with seed {:#018x}",
        plan.frames.len(),
        plan.ship_count(),
        rng.seed()
    );

    let directory = out_dir.join(plan.directory());
    let mut ships = Vec::new();
    let mut frames = Vec::with_capacity(plan.frames.len());
    let mut floor_z = 0.0;

    for frame in &plan.frames {
        if frame.regenerate {
            let ship = generate_with(generation, &mut rng)?;
            floor_z = ship.lowest_z() - FLOOR_GAP;

            let name = format!("{}_ship_{:03}.obj", plan.timestamp, ships.len());
            write_obj(&ship, &directory.join(&name))?;
            info!("Frame {}: ship {} written to {name}", frame.index, ships.len());
            ships.push(plan.directory().join(name));
        }

        frames.push(TrackFrame {
            frame: frame.index,
            time: frame.time,
            ship: ships.len().saturating_sub(1),
            floor_z,
            camera: frame.camera,
            image: frame.image.clone(),
        });
    }

    let track = CameraTrack {
        fps: movie.fps,
        fov: movie.fov,
        resolution: movie.resolution,
        ships: ships.clone(),
        frames,
    };
    let track_path = directory.join(format!("{}_camera.json", plan.timestamp));
    let json = serde_json::to_string_pretty(&track).map_err(ExportError::from)?;
    std::fs::write(&track_path, json).map_err(|e| ExportError::io(&track_path, e))?;
    info!("Camera track written to {:?}", track_path);

    Ok(MovieOutput {
        directory,
        ships,
        track: track_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_frame_path_format() {
        assert_eq!(
            frame_path("20240102_030405", 7),
            PathBuf::from("renders/20240102_030405/20240102_030405_00007.png")
        );
    }

    #[test]
    fn test_default_plan() {
        let plan = MoviePlan::new(&MovieConfig::default(), started()).unwrap();

        assert_eq!(plan.timestamp, "20240102_030405");
        assert_eq!(plan.frames.len(), 240);
        let regenerated: Vec<u32> = plan
            .frames
            .iter()
            .filter(|f| f.regenerate)
            .map(|f| f.index)
            .collect();
        assert_eq!(regenerated, vec![0, 119, 239]);
    }

    #[test]
    fn test_camera_start_pose() {
        let config = MovieConfig::default();
        let pose = config.camera_at(0.0);

        // Pitch starts at the top of its bob
        assert!((pose.pitch_degrees - 50.0).abs() < 1e-4);
        assert!(pose.location.x.abs() < 1e-5);
        assert!((pose.location.y + 10.0).abs() < 1e-4);
        assert!((pose.location.z - 50f32.to_radians().sin() * 10.0).abs() < 1e-4);
        assert!((pose.rotation.x - 40f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_camera_stays_on_pole() {
        let config = MovieConfig::default();
        for frame in MoviePlan::new(&config, started()).unwrap().frames {
            let pose = frame.camera;
            let horizontal = pose.location.truncate().length();
            assert!((horizontal - config.pole_length).abs() < 1e-3);
            assert!(pose.pitch_degrees >= config.pitch_min - 1e-4);
            assert!(pose.pitch_degrees <= config.pitch_max + 1e-4);
        }
    }

    #[test]
    fn test_invalid_movie_config() {
        let config = MovieConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(matches!(
            MoviePlan::new(&config, started()),
            Err(ConfigError::NotPositive { name: "fps", .. })
        ));
    }

    #[test]
    fn test_render_movie_writes_ships_and_track() {
        let dir = tempfile::tempdir().unwrap();
        let movie = MovieConfig {
            fps: 2,
            duration: 2.0,
            ship_duration: 1.0,
            ..Default::default()
        };
        let generation = GenerationConfig {
            detail: false,
            ..Default::default()
        };
        let plan = MoviePlan::new(&movie, started()).unwrap();

        let output = render_movie(&plan, &movie, &generation, Some("movie"), dir.path()).unwrap();

        assert_eq!(output.ships.len(), 3);
        for ship in &output.ships {
            assert!(dir.path().join(ship).exists());
        }

        let track: CameraTrack =
            serde_json::from_str(&std::fs::read_to_string(&output.track).unwrap()).unwrap();
        assert_eq!(track.frames.len(), 4);
        assert_eq!(track.frames.iter().map(|f| f.ship).collect::<Vec<_>>(), vec![0, 1, 1, 2]);
        assert!(track.frames.iter().all(|f| f.floor_z < 0.0));
    }
}
