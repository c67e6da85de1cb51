//! Generation configuration and the `ship.toml` file format
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [generation]
//! hull_segments = { min = 2, max = 8 }
//! mirror_vertical = true
//!
//! [movie]
//! fps = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::movie::MovieConfig;

/// Inclusive integer range for segment counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRange {
    pub min: u32,
    pub max: u32,
}

impl SegmentRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn validate(self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Parameters of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Segments grown from each side face of the base box
    pub hull_segments: SegmentRange,

    /// Grow short protrusions from random faces
    pub asymmetry: bool,
    /// Extrusions per protrusion
    pub asymmetry_segments: SegmentRange,

    /// Decorate faces with engines, grids, turrets and friends
    pub detail: bool,

    /// Mirror along X, across the YZ plane
    pub mirror_horizontal: bool,
    /// Mirror along Y, across the XZ plane
    pub mirror_vertical: bool,

    /// Bevel sharp edges when building the render mesh
    pub bevel: bool,

    /// Build the material palette
    pub assign_materials: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            hull_segments: SegmentRange::new(3, 6),
            asymmetry: true,
            asymmetry_segments: SegmentRange::new(1, 5),
            detail: true,
            mirror_horizontal: true,
            mirror_vertical: false,
            bevel: true,
            assign_materials: true,
        }
    }
}

impl GenerationConfig {
    /// Reject configurations that cannot be generated
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hull_segments.validate("hull_segments")?;
        if self.hull_segments.max == 0 {
            return Err(ConfigError::EmptyRange {
                name: "hull_segments",
            });
        }
        self.asymmetry_segments.validate("asymmetry_segments")?;
        Ok(())
    }
}

/// Contents of a `ship.toml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipManifest {
    pub generation: GenerationConfig,
    pub movie: MovieConfig,
}

impl ShipManifest {
    /// Load a manifest from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a manifest from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let manifest: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        manifest.generation.validate()?;
        manifest.movie.validate()?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GenerationConfig::default();
        assert_eq!(config.hull_segments, SegmentRange::new(3, 6));
        assert_eq!(config.asymmetry_segments, SegmentRange::new(1, 5));
        assert!(config.mirror_horizontal);
        assert!(!config.mirror_vertical);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = GenerationConfig {
            hull_segments: SegmentRange::new(5, 2),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                name: "hull_segments",
                min: 5,
                max: 2
            })
        );
    }

    #[test]
    fn test_zero_hull_segments_rejected() {
        let config = GenerationConfig {
            hull_segments: SegmentRange::new(0, 0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_parse_partial_manifest() {
        let manifest = ShipManifest::parse(
            r#"
            [generation]
            hull_segments = { min = 2, max = 8 }
            bevel = false

            [movie]
            fps = 30
            "#,
        )
        .unwrap();

        assert_eq!(manifest.generation.hull_segments, SegmentRange::new(2, 8));
        assert!(!manifest.generation.bevel);
        assert!(manifest.generation.detail);
        assert_eq!(manifest.movie.fps, 30);
        assert_eq!(manifest.movie.pole_length, 10.0);
    }

    #[test]
    fn test_parse_empty_manifest() {
        assert_eq!(ShipManifest::parse("").unwrap(), ShipManifest::default());
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let err = ShipManifest::parse("[generation]\nasymmetry_segments = { min = 4, max = 1 }")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));

        let err = ShipManifest::parse("[generation]\nhull_segments = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ShipManifest::load(Path::new("/nonexistent/ship.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
