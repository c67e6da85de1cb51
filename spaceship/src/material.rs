//! Material slots and the appearance palette
//!
//! Generation only tags faces with a [`MaterialSlot`]. The palette that turns
//! slots into shading parameters is built afterwards from the same random
//! stream, so the colours of a ship are as reproducible as its shape.

use serde::{Deserialize, Serialize};

use crate::rng::RandomStream;

/// Closed set of material slots assigned to faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSlot {
    #[default]
    Hull,
    HullLights,
    HullDark,
    ExhaustBurn,
    GlowDisc,
}

impl MaterialSlot {
    /// All slots in index order
    pub const ALL: [MaterialSlot; 5] = [
        MaterialSlot::Hull,
        MaterialSlot::HullLights,
        MaterialSlot::HullDark,
        MaterialSlot::ExhaustBurn,
        MaterialSlot::GlowDisc,
    ];

    /// Stable slot index (0..5)
    pub fn index(self) -> usize {
        match self {
            MaterialSlot::Hull => 0,
            MaterialSlot::HullLights => 1,
            MaterialSlot::HullDark => 2,
            MaterialSlot::ExhaustBurn => 3,
            MaterialSlot::GlowDisc => 4,
        }
    }

    /// Slot name as written to material libraries
    pub fn name(self) -> &'static str {
        match self {
            MaterialSlot::Hull => "hull",
            MaterialSlot::HullLights => "hull_lights",
            MaterialSlot::HullDark => "hull_dark",
            MaterialSlot::ExhaustBurn => "exhaust_burn",
            MaterialSlot::GlowDisc => "glow_disc",
        }
    }
}

/// Texture resources referenced by hull materials
pub mod textures {
    pub const HULL_NORMAL: &str = "textures/hull_normal.png";
    pub const HULL_LIGHTS_DIFFUSE: &str = "textures/hull_lights_diffuse.png";
    pub const HULL_LIGHTS_EMIT: &str = "textures/hull_lights_emit.png";
}

/// Shading parameters for one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Linear RGB base colour (0.0 - 1.0)
    pub base_color: [f32; 3],
    /// Specular intensity
    pub specular: f32,
    /// Roughness factor (0.0 = mirror, 1.0 = rough)
    pub roughness: f32,
    /// Emitted RGB colour
    pub emission_color: [f32; 3],
    /// Emission intensity (0.0 = none)
    pub emission_strength: f32,
    /// Box-projected normal map
    pub normal_map: Option<String>,
    /// Box-projected diffuse texture replacing the base colour
    pub diffuse_map: Option<String>,
    /// Box-projected emission texture
    pub emission_map: Option<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8],
            specular: 0.5,
            roughness: 0.5,
            emission_color: [0.0, 0.0, 0.0],
            emission_strength: 0.0,
            normal_map: None,
            diffuse_map: None,
            emission_map: None,
        }
    }
}

impl Appearance {
    fn hull(color: [f32; 3]) -> Self {
        Self {
            base_color: color,
            specular: 0.1,
            normal_map: Some(textures::HULL_NORMAL.to_string()),
            ..Self::default()
        }
    }
}

/// One appearance per material slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPalette {
    pub hull: Appearance,
    pub hull_lights: Appearance,
    pub hull_dark: Appearance,
    pub exhaust_burn: Appearance,
    pub glow_disc: Appearance,
}

impl MaterialPalette {
    /// Build the palette, drawing the hull colour from `rng`
    ///
    /// Consumes exactly three draws: hue, lightness, saturation.
    pub fn generate(rng: &mut RandomStream) -> Self {
        let hue = rng.unit();
        let lightness = rng.uniform(0.05, 0.5);
        let saturation = rng.uniform(0.0, 0.25);
        let base = hls_to_rgb(hue, lightness, saturation);

        let hull = Appearance::hull(base);

        let hull_lights = Appearance {
            diffuse_map: Some(textures::HULL_LIGHTS_DIFFUSE.to_string()),
            emission_map: Some(textures::HULL_LIGHTS_EMIT.to_string()),
            emission_color: [1.0, 1.0, 1.0],
            emission_strength: 5.0,
            ..Appearance::hull(base)
        };

        let hull_dark = Appearance::hull([base[0] * 0.1, base[1] * 0.1, base[2] * 0.1]);

        let exhaust_burn = Appearance {
            emission_color: [1.0, 0.6, 0.2],
            emission_strength: 10.0,
            roughness: 0.5,
            ..Appearance::default()
        };

        let glow_disc = Appearance {
            emission_color: [0.8, 0.8, 1.0],
            emission_strength: 10.0,
            ..Appearance::default()
        };

        Self {
            hull,
            hull_lights,
            hull_dark,
            exhaust_burn,
            glow_disc,
        }
    }

    /// Resolve a slot to its appearance
    pub fn resolve(&self, slot: MaterialSlot) -> &Appearance {
        match slot {
            MaterialSlot::Hull => &self.hull,
            MaterialSlot::HullLights => &self.hull_lights,
            MaterialSlot::HullDark => &self.hull_dark,
            MaterialSlot::ExhaustBurn => &self.exhaust_burn,
            MaterialSlot::GlowDisc => &self.glow_disc,
        }
    }
}

/// HLS to RGB conversion, all channels in [0, 1]
#[inline]
pub fn hls_to_rgb(h: f32, l: f32, s: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }

    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    [
        hue_channel(m1, m2, h + 1.0 / 3.0),
        hue_channel(m1, m2, h),
        hue_channel(m1, m2, h - 1.0 / 3.0),
    ]
}

#[inline]
fn hue_channel(m1: f32, m2: f32, hue: f32) -> f32 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indices_match_all_order() {
        for (i, slot) in MaterialSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_hls_grey_when_unsaturated() {
        assert_eq!(hls_to_rgb(0.3, 0.4, 0.0), [0.4, 0.4, 0.4]);
    }

    #[test]
    fn test_hls_pure_red() {
        let rgb = hls_to_rgb(0.0, 0.5, 1.0);
        assert!((rgb[0] - 1.0).abs() < 1e-6);
        assert!(rgb[1].abs() < 1e-6);
        assert!(rgb[2].abs() < 1e-6);
    }

    #[test]
    fn test_palette_is_deterministic() {
        let a = MaterialPalette::generate(&mut RandomStream::from_seed(3));
        let b = MaterialPalette::generate(&mut RandomStream::from_seed(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hull_dark_is_darker() {
        let palette = MaterialPalette::generate(&mut RandomStream::from_seed(9));
        for c in 0..3 {
            assert!(palette.hull_dark.base_color[c] <= palette.hull.base_color[c]);
        }
        assert_eq!(palette.resolve(MaterialSlot::ExhaustBurn).emission_strength, 10.0);
    }
}
