//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::blend::TintColor;

/// Parses an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
/// Empty values count as unset.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("source")) {
        let source = &mut config.source;
        if let Some(v) = value(section, "map_address") {
            source.map_address = Some(v.to_string());
        }
        if let Some(v) = value(section, "tile_path") {
            source.tile_path = v.to_string();
        }
        if let Some(v) = value(section, "world") {
            source.world = v.to_string();
        }
    }

    if let Some(section) = ini.section(Some("render")) {
        let blend = &mut config.render.blend;
        let key = Key::new("render", section);

        key.flag("contour", &mut blend.contour)?;
        key.parse("interval", &mut blend.interval, "must be a positive integer")?;
        if blend.interval == 0 {
            return Err(invalid("render", "interval", "0", "must be at least 1"));
        }
        key.parse("radius", &mut blend.radius, "must be a non-negative integer")?;
        key.parse("fit_low", &mut blend.low_threshold, "must be 0-255")?;
        key.parse("fit_high", &mut blend.high_threshold, "must be 0-255")?;
        key.parse("opacity", &mut blend.opacity, "must be 0-255")?;
        key.flag("best_fit", &mut blend.best_fit)?;
        key.flag("fit", &mut blend.fit)?;
        key.flag("lower", &mut blend.lower)?;
        key.flag("upper", &mut blend.upper)?;
        key.parse::<TintColor>("lower_color", &mut blend.lower_color, COLOR_REASON)?;
        key.parse::<TintColor>("fit_color", &mut blend.fit_color, COLOR_REASON)?;
        key.parse::<TintColor>("upper_color", &mut blend.upper_color, COLOR_REASON)?;
    }

    if let Some(section) = ini.section(Some("download")) {
        let key = Key::new("download", section);
        key.parse("timeout", &mut config.download.timeout, "must be a positive integer (seconds)")?;
        if config.download.timeout == 0 {
            return Err(invalid("download", "timeout", "0", "must be at least 1 second"));
        }
        key.parse("parallel", &mut config.download.parallel, "must be a positive integer")?;
        if config.download.parallel == 0 {
            return Err(invalid("download", "parallel", "0", "must be at least 1"));
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = value(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

const COLOR_REASON: &str = "expected a color like #00FF38";

/// Typed accessors for one section.
struct Key<'a> {
    section: &'static str,
    properties: &'a Properties,
}

impl<'a> Key<'a> {
    fn new(section: &'static str, properties: &'a Properties) -> Self {
        Self {
            section,
            properties,
        }
    }

    /// Overwrites `target` with the parsed value, if the key is set.
    fn parse<T: FromStr>(
        &self,
        key: &str,
        target: &mut T,
        reason: &str,
    ) -> Result<(), ConfigFileError> {
        if let Some(v) = value(self.properties, key) {
            *target = v
                .parse()
                .map_err(|_| invalid(self.section, key, v, reason))?;
        }
        Ok(())
    }

    fn flag(&self, key: &str, target: &mut bool) -> Result<(), ConfigFileError> {
        if let Some(v) = value(self.properties, key) {
            *target = parse_bool(v)
                .ok_or_else(|| invalid(self.section, key, v, "must be true or false"))?;
        }
        Ok(())
    }
}

fn value<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a boolean, accepting true/false, yes/no, on/off and 1/0.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
