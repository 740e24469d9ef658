//! Blend settings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::BlendError;
use crate::tile::Bgra;

/// Default contour interval in elevation steps.
pub const DEFAULT_INTERVAL: u32 = 16;
/// Default contour neighbourhood radius in pixels.
pub const DEFAULT_RADIUS: u32 = 1;
/// Default lower bound of the fit band.
pub const DEFAULT_LOW_THRESHOLD: u8 = 65;
/// Default upper bound of the fit band.
pub const DEFAULT_HIGH_THRESHOLD: u8 = 90;
/// Default tint opacity.
pub const DEFAULT_OPACITY: u8 = 70;

/// An opaque RGB tint color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TintColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The tint as a translucent pixel with the given alpha.
    pub fn with_alpha(self, alpha: u8) -> Bgra {
        Bgra::rgba(self.r, self.g, self.b, alpha)
    }
}

/// Error parsing a `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{0}': expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl FromStr for TintColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for TintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Settings for one blend pass.
///
/// Elevation is the base layer's blue channel. The thresholds split it into
/// three bands: *lower* (`< low_threshold`), *fit*
/// (`low_threshold..=high_threshold`) and *upper* (`> high_threshold`).
/// Each band can be tinted independently, and all tinting is gated by
/// `best_fit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendConfig {
    /// Draw contour lines
    pub contour: bool,
    /// Elevation step between contour lines (at least 1)
    pub interval: u32,
    /// Neighbourhood radius for contour detection
    pub radius: u32,
    /// Lowest elevation inside the fit band
    pub low_threshold: u8,
    /// Highest elevation inside the fit band
    pub high_threshold: u8,
    /// Tint for elevations below the fit band
    pub lower_color: TintColor,
    /// Tint for elevations inside the fit band
    pub fit_color: TintColor,
    /// Tint for elevations above the fit band
    pub upper_color: TintColor,
    /// Alpha applied to every tint
    pub opacity: u8,
    /// Master switch for all tints
    pub best_fit: bool,
    /// Tint the lower band
    pub lower: bool,
    /// Tint the fit band
    pub fit: bool,
    /// Tint the upper band
    pub upper: bool,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            contour: false,
            interval: DEFAULT_INTERVAL,
            radius: DEFAULT_RADIUS,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            lower_color: TintColor::new(0x00, 0x5C, 0xFF),
            fit_color: TintColor::new(0x00, 0xFF, 0x38),
            upper_color: TintColor::new(0xFF, 0x00, 0x00),
            opacity: DEFAULT_OPACITY,
            best_fit: true,
            lower: false,
            fit: true,
            upper: false,
        }
    }
}

impl BlendConfig {
    /// Settings that reduce blending to plain alpha compositing.
    pub fn plain() -> Self {
        Self {
            contour: false,
            best_fit: false,
            ..Self::default()
        }
    }

    /// Checks that the settings can be applied.
    pub fn validate(&self) -> Result<(), BlendError> {
        if self.interval == 0 {
            return Err(BlendError::InvalidConfig(
                "contour interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if the fit band should be tinted at this elevation.
    pub fn tints_fit(&self, elevation: u8) -> bool {
        self.best_fit
            && self.fit
            && (self.low_threshold..=self.high_threshold).contains(&elevation)
    }

    /// Returns true if the lower band should be tinted at this elevation.
    pub fn tints_lower(&self, elevation: u8) -> bool {
        self.best_fit && self.lower && elevation < self.low_threshold
    }

    /// Returns true if the upper band should be tinted at this elevation.
    pub fn tints_upper(&self, elevation: u8) -> bool {
        self.best_fit && self.upper && elevation > self.high_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlendConfig::default();
        assert!(!config.contour);
        assert_eq!(config.interval, 16);
        assert_eq!(config.radius, 1);
        assert_eq!(config.low_threshold, 65);
        assert_eq!(config.high_threshold, 90);
        assert_eq!(config.opacity, 70);
        assert!(config.best_fit && config.fit);
        assert!(!config.lower && !config.upper);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = BlendConfig {
            interval: 0,
            ..BlendConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BlendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_band_boundaries_inclusive_for_fit() {
        let config = BlendConfig {
            lower: true,
            upper: true,
            ..BlendConfig::default()
        };

        assert!(config.tints_fit(65));
        assert!(config.tints_fit(90));
        assert!(!config.tints_lower(65));
        assert!(!config.tints_upper(90));

        assert!(config.tints_lower(64));
        assert!(config.tints_upper(91));
        assert!(!config.tints_fit(64) && !config.tints_fit(91));
    }

    #[test]
    fn test_best_fit_gates_all_bands() {
        let config = BlendConfig {
            best_fit: false,
            lower: true,
            upper: true,
            ..BlendConfig::default()
        };

        assert!(!config.tints_fit(70));
        assert!(!config.tints_lower(0));
        assert!(!config.tints_upper(255));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!("#005CFF".parse(), Ok(TintColor::new(0x00, 0x5C, 0xFF)));
        assert_eq!("ff0000".parse(), Ok(TintColor::new(0xFF, 0, 0)));
        assert!("#12345".parse::<TintColor>().is_err());
        assert!("#GG0000".parse::<TintColor>().is_err());
        assert!("#ééé".parse::<TintColor>().is_err());
    }

    #[test]
    fn test_color_display_roundtrip() {
        let color = TintColor::new(0x00, 0xFF, 0x38);
        assert_eq!(color.to_string(), "#00FF38");
        assert_eq!(color.to_string().parse(), Ok(color));
    }

    #[test]
    fn test_with_alpha() {
        let pixel = TintColor::new(1, 2, 3).with_alpha(70);
        assert_eq!(pixel, Bgra::new(3, 2, 1, 70));
    }
}
