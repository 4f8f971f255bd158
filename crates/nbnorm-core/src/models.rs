//! Data models for Nbnorm
//!
//! Option structs and enums shared by the pipeline, the configuration
//! layer, and the CLI.

use serde::{Deserialize, Serialize};

/// Fixed plane roles of the input cube.
///
/// Channel 0 is the reference/luminance source (typically Hα), channel 1
/// is OIII, channel 2 is SII. This ordering is a convention of the input
/// format, not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Reference,
    Oiii,
    Sii,
}

impl ChannelRole {
    /// Plane index inside the cube.
    pub fn index(self) -> usize {
        match self {
            Self::Reference => 0,
            Self::Oiii => 1,
            Self::Sii => 2,
        }
    }
}

/// Output domain for the final triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Pre-gamma linear triplet (reference, SCNR-adjusted OIII, SII)
    Linear,

    /// Gamma-compressed reconstruction after the LAB round trip
    #[default]
    NonLinear,
}

/// Source of the lightness plane substituted after the forward transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LightnessSource {
    /// Keep the derived (L+16)/116 value (no substitution)
    #[default]
    Derived,

    /// CIE lightness computed from the raw cube's pooled luminance
    CieFromSource,

    /// Reference plane, as (c0 + 0.16)/1.16
    Reference,

    /// SII plane, as (c2 + 0.16)/1.16
    Sii,

    /// OIII plane, as (c1 + 0.16)/1.16
    Oiii,
}

/// Options for one composite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Output domain selection
    #[serde(default)]
    pub mode: OutputMode,

    /// Lightness substitution source
    #[serde(default)]
    pub lightness: LightnessSource,

    /// Suppress the green color cast via SCNR
    #[serde(default)]
    pub scnr: bool,

    /// Blackpoint fraction between pooled min (0.0) and median (1.0)
    #[serde(default = "default_one")]
    pub blackpoint: f32,

    /// OIII stretch divisor (> 0)
    #[serde(default = "default_one")]
    pub oiii_boost: f32,

    /// SII stretch divisor (> 0)
    #[serde(default = "default_one")]
    pub sii_boost: f32,

    /// Highlight-recovery ceiling for the final clip (> 0)
    #[serde(default = "default_one")]
    pub hl_recover: f32,

    /// Highlight-reduction strength (> 0)
    #[serde(default = "default_one")]
    pub hl_reduction: f32,

    /// Brightness divisor (> 0)
    #[serde(default = "default_one")]
    pub brightness: f32,

    /// Write three single-plane files instead of one combined file
    #[serde(default)]
    pub save_channels: bool,

    /// Enable debug output showing intermediate statistics
    #[serde(default)]
    pub debug: bool,
}

fn default_one() -> f32 {
    1.0
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            lightness: LightnessSource::default(),
            scnr: false,
            blackpoint: 1.0,
            oiii_boost: 1.0,
            sii_boost: 1.0,
            hl_recover: 1.0,
            hl_reduction: 1.0,
            brightness: 1.0,
            save_channels: false,
            debug: false,
        }
    }
}

impl ProcessOptions {
    /// Validate the numeric ranges of the configuration surface.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.blackpoint) {
            return Err(format!(
                "blackpoint {} must be in range [0.0, 1.0]",
                self.blackpoint
            ));
        }

        for (value, name) in [
            (self.oiii_boost, "oiii_boost"),
            (self.sii_boost, "sii_boost"),
            (self.hl_recover, "hl_recover"),
            (self.hl_reduction, "hl_reduction"),
            (self.brightness, "brightness"),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(format!("{} {} must be a positive number", name, value));
            }
        }

        Ok(())
    }
}
