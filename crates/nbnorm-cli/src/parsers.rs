//! Parsing of the numeric CLI flags
//!
//! The mode, lightness, and SCNR flags keep the numeric values of the
//! established tool interface; parsing maps them onto the core enums with
//! explicit range errors.

use nbnorm_core::models::{LightnessSource, OutputMode, ProcessOptions};

/// Parse the output mode flag: 0 = linear, 1 = non-linear.
pub fn parse_output_mode(value: u8) -> Result<OutputMode, String> {
    match value {
        0 => Ok(OutputMode::Linear),
        1 => Ok(OutputMode::NonLinear),
        other => Err(format!("mode must be 0 (linear) or 1 (non-linear), got {}", other)),
    }
}

/// Parse the lightness flag: 0 = derived, 1 = CIE-L from source,
/// 2 = reference plane, 3 = SII plane, 4 = OIII plane.
pub fn parse_lightness(value: u8) -> Result<LightnessSource, String> {
    match value {
        0 => Ok(LightnessSource::Derived),
        1 => Ok(LightnessSource::CieFromSource),
        2 => Ok(LightnessSource::Reference),
        3 => Ok(LightnessSource::Sii),
        4 => Ok(LightnessSource::Oiii),
        other => Err(format!("lightness must be in 0..=4, got {}", other)),
    }
}

/// Parse an on/off flag given as 0 or 1.
pub fn parse_switch(name: &str, value: u8) -> Result<bool, String> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(format!("{} must be 0 (off) or 1 (on), got {}", name, other)),
    }
}

/// Numeric flags of the `process` command, all optional so the defaults
/// file can fill the gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessFlags {
    pub mode: Option<u8>,
    pub lightness: Option<u8>,
    pub scnr: Option<u8>,
    pub blackpoint: Option<f32>,
    pub oiii_boost: Option<f32>,
    pub sii_boost: Option<f32>,
    pub hl_recover: Option<f32>,
    pub hl_reduction: Option<f32>,
    pub brightness: Option<f32>,
    pub save_channels: bool,
    pub debug: bool,
}

/// Resolve flag > defaults-file > built-in, then validate the result.
pub fn resolve_options(
    flags: &ProcessFlags,
    defaults: &ProcessOptions,
) -> Result<ProcessOptions, String> {
    let mut options = defaults.clone();

    if let Some(mode) = flags.mode {
        options.mode = parse_output_mode(mode)?;
    }
    if let Some(lightness) = flags.lightness {
        options.lightness = parse_lightness(lightness)?;
    }
    if let Some(scnr) = flags.scnr {
        options.scnr = parse_switch("scnr", scnr)?;
    }
    if let Some(blackpoint) = flags.blackpoint {
        options.blackpoint = blackpoint;
    }
    if let Some(boost) = flags.oiii_boost {
        options.oiii_boost = boost;
    }
    if let Some(boost) = flags.sii_boost {
        options.sii_boost = boost;
    }
    if let Some(recover) = flags.hl_recover {
        options.hl_recover = recover;
    }
    if let Some(reduction) = flags.hl_reduction {
        options.hl_reduction = reduction;
    }
    if let Some(brightness) = flags.brightness {
        options.brightness = brightness;
    }
    options.save_channels |= flags.save_channels;
    options.debug |= flags.debug;

    options.validate()?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_mode() {
        assert_eq!(parse_output_mode(0).unwrap(), OutputMode::Linear);
        assert_eq!(parse_output_mode(1).unwrap(), OutputMode::NonLinear);
        assert!(parse_output_mode(2).is_err());
    }

    #[test]
    fn test_parse_lightness() {
        assert_eq!(parse_lightness(0).unwrap(), LightnessSource::Derived);
        assert_eq!(parse_lightness(1).unwrap(), LightnessSource::CieFromSource);
        assert_eq!(parse_lightness(2).unwrap(), LightnessSource::Reference);
        assert_eq!(parse_lightness(3).unwrap(), LightnessSource::Sii);
        assert_eq!(parse_lightness(4).unwrap(), LightnessSource::Oiii);
        assert!(parse_lightness(5).is_err());
    }

    #[test]
    fn test_parse_switch() {
        assert!(!parse_switch("scnr", 0).unwrap());
        assert!(parse_switch("scnr", 1).unwrap());
        let err = parse_switch("scnr", 3).unwrap_err();
        assert!(err.contains("scnr"));
    }

    #[test]
    fn test_resolve_options_flag_wins_over_defaults() {
        let mut defaults = ProcessOptions::default();
        defaults.blackpoint = 0.8;
        defaults.scnr = true;

        let flags = ProcessFlags {
            blackpoint: Some(0.2),
            ..Default::default()
        };

        let options = resolve_options(&flags, &defaults).unwrap();
        assert!((options.blackpoint - 0.2).abs() < f32::EPSILON);
        // Unset flags keep the supplied defaults.
        assert!(options.scnr);
    }

    #[test]
    fn test_resolve_options_validates_ranges() {
        let flags = ProcessFlags {
            brightness: Some(-1.0),
            ..Default::default()
        };
        assert!(resolve_options(&flags, &ProcessOptions::default()).is_err());
    }
}
