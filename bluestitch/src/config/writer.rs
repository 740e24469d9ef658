//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Converts a `ConfigFile` to the commented INI text written to config.ini.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let map_address = config.source.map_address.as_deref().unwrap_or("");
    let blend = &config.render.blend;

    format!(
        r#"[source]
; Base address of the map, e.g. http://localhost:8100/
; Tile paths are resolved relative to it, so keep the trailing slash
map_address = {}
; Tile path template; {{x}}, {{z}} and {{world}} are substituted per tile
tile_path = {}
; World name substituted for {{world}}
world = {}

[render]
; Draw contour lines where the elevation crosses a multiple of `interval`
contour = {}
; Elevation step between contour lines (default: 16, at least 1)
interval = {}
; Neighbourhood radius in pixels for contour detection (default: 1)
radius = {}
; Elevation band tinting. The fit band is fit_low..=fit_high;
; lower is below it, upper above it. best_fit switches all tints.
best_fit = {}
fit_low = {}
fit_high = {}
fit = {}
lower = {}
upper = {}
fit_color = {}
lower_color = {}
upper_color = {}
; Tint alpha, 0-255 (default: 70)
opacity = {}

[download]
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}
; Tiles fetched and blended at once (default: 4)
parallel = {}

[logging]
; Log file, truncated at the start of every run
file = {}
"#,
        map_address,
        config.source.tile_path,
        config.source.world,
        blend.contour,
        blend.interval,
        blend.radius,
        blend.best_fit,
        blend.low_threshold,
        blend.high_threshold,
        blend.fit,
        blend.lower,
        blend.upper,
        blend.fit_color,
        blend.lower_color,
        blend.upper_color,
        blend.opacity,
        config.download.timeout,
        config.download.parallel,
        path_to_string(&config.logging.file),
    )
}

/// Converts a path to a string, collapsing the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
