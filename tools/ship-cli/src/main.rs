//! shipgen - procedural spaceship generator
//!
//! Generates ship meshes as Wavefront OBJ/MTL, or plans a fly-by movie that
//! writes one mesh per ship and a camera track.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use spaceship::{
    GenerationConfig, MovieConfig, SegmentRange, ShipManifest, generate, plan_movie, render_movie, write_obj,
    write_render_obj,
};

#[derive(Parser)]
#[command(name = "shipgen")]
#[command(about = "Procedural spaceship generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one ship
    Generate {
        /// Seed string (random if omitted)
        #[arg(short, long)]
        seed: Option<String>,

        /// Output OBJ file
        #[arg(short, long, default_value = "spaceship.obj")]
        output: PathBuf,

        /// Write the mirrored, bevelled triangle mesh instead of the polygon mesh
        #[arg(long)]
        render: bool,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Generate a fly-by movie: ship meshes plus a camera track
    Movie {
        /// Seed string (random if omitted)
        #[arg(short, long)]
        seed: Option<String>,

        /// Output directory; frames go under renders/<timestamp>/
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Movie length in seconds
        #[arg(long)]
        duration: Option<f32>,

        /// Seconds each ship stays on screen
        #[arg(long)]
        ship_duration: Option<f32>,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Validate a ship.toml without generating
    Check {
        /// Path to ship.toml
        #[arg(default_value = "ship.toml")]
        config: PathBuf,
    },
}

/// Generation overrides shared by every subcommand
#[derive(Args)]
struct GenerationArgs {
    /// ship.toml with generation and movie settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum hull segments per side
    #[arg(long)]
    hull_min: Option<u32>,

    /// Maximum hull segments per side
    #[arg(long)]
    hull_max: Option<u32>,

    /// Skip asymmetric protrusions
    #[arg(long)]
    no_asymmetry: bool,

    /// Minimum extrusions per protrusion
    #[arg(long)]
    asymmetry_min: Option<u32>,

    /// Maximum extrusions per protrusion
    #[arg(long)]
    asymmetry_max: Option<u32>,

    /// Skip surface detail
    #[arg(long)]
    no_detail: bool,

    /// Do not mirror along X (across the YZ plane)
    #[arg(long)]
    no_mirror_horizontal: bool,

    /// Also mirror along Y (across the XZ plane)
    #[arg(long)]
    mirror_vertical: bool,

    /// Do not bevel edges
    #[arg(long)]
    no_bevel: bool,

    /// Do not write materials
    #[arg(long)]
    no_materials: bool,
}

impl GenerationArgs {
    /// Load the manifest (or defaults) and apply flag overrides
    fn resolve(&self) -> Result<ShipManifest> {
        let mut manifest = match &self.config {
            Some(path) => {
                ShipManifest::load(path).with_context(|| format!("Failed to load config {:?}", path))?
            }
            None => ShipManifest::default(),
        };
        self.apply(&mut manifest.generation);
        manifest
            .generation
            .validate()
            .context("Invalid generation settings")?;
        Ok(manifest)
    }

    fn apply(&self, config: &mut GenerationConfig) {
        config.hull_segments = SegmentRange::new(
            self.hull_min.unwrap_or(config.hull_segments.min),
            self.hull_max.unwrap_or(config.hull_segments.max),
        );
        config.asymmetry_segments = SegmentRange::new(
            self.asymmetry_min.unwrap_or(config.asymmetry_segments.min),
            self.asymmetry_max.unwrap_or(config.asymmetry_segments.max),
        );
        config.asymmetry &= !self.no_asymmetry;
        config.detail &= !self.no_detail;
        config.mirror_horizontal &= !self.no_mirror_horizontal;
        config.mirror_vertical |= self.mirror_vertical;
        config.bevel &= !self.no_bevel;
        config.assign_materials &= !self.no_materials;
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            seed,
            output,
            render,
            generation,
        } => {
            let manifest = generation.resolve()?;
            generate_one(&manifest.generation, seed.as_deref(), &output, render)?;
        }
        Commands::Movie {
            seed,
            output,
            fps,
            duration,
            ship_duration,
            generation,
        } => {
            let manifest = generation.resolve()?;
            let movie = MovieConfig {
                fps: fps.unwrap_or(manifest.movie.fps),
                duration: duration.unwrap_or(manifest.movie.duration),
                ship_duration: ship_duration.unwrap_or(manifest.movie.ship_duration),
                ..manifest.movie
            };
            movie.validate().context("Invalid movie settings")?;

            let plan = plan_movie(&movie)?;
            let result = render_movie(&plan, &movie, &manifest.generation, seed.as_deref(), &output)
                .context("Movie generation failed")?;
            tracing::info!(
                "Movie done: {} ships, {} frames planned in {:?}",
                result.ships.len(),
                plan.frames.len(),
                result.directory
            );
        }
        Commands::Check { config } => {
            ShipManifest::load(&config).with_context(|| format!("Invalid config {:?}", config))?;
            tracing::info!("{:?} is valid", config);
        }
    }

    Ok(())
}

fn generate_one(config: &GenerationConfig, seed: Option<&str>, output: &Path, render: bool) -> Result<()> {
    let ship = generate(config, seed).context("Generation failed")?;

    let written = if render {
        write_render_obj(&ship, output)
    } else {
        write_obj(&ship, output)
    }
    .with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Generated ship {:#018x}: {} faces -> {:?}",
        ship.seed,
        ship.mesh.face_count(),
        output
    );
    if let Some(mtl) = written {
        tracing::info!("Materials -> {:?}", mtl);
    }
    Ok(())
}
