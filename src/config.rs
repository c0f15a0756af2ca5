use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{anyhow, Context, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub markers: MarkerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub volcanoes_csv: PathBuf,
    pub regions_geojson: PathBuf,
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            volcanoes_csv: PathBuf::from("volcanoes_spain.txt"),
            regions_geojson: PathBuf::from("world.json"),
            delimiter: ',',
        }
    }
}

impl InputConfig {
    /// The csv crate only splits on single bytes.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| anyhow!("Delimiter must be a single ASCII character, got {:?}", self.delimiter))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    /// [latitude, longitude]
    pub center: [f64; 2],
    pub zoom_start: u8,
    pub tiles: TileStyle,
    pub title: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [41.73546232379051, 1.8283699478719764],
            zoom_start: 9,
            tiles: TileStyle::CartoDbPositron,
            title: "Volcanoes".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TileStyle {
    #[serde(rename = "OpenStreetMap")]
    OpenStreetMap,
    #[serde(rename = "CartoDB positron")]
    CartoDbPositron,
    #[serde(rename = "CartoDB dark_matter")]
    CartoDbDarkMatter,
}

impl TileStyle {
    pub fn name(&self) -> &'static str {
        match self {
            TileStyle::OpenStreetMap => "OpenStreetMap",
            TileStyle::CartoDbPositron => "CartoDB positron",
            TileStyle::CartoDbDarkMatter => "CartoDB dark_matter",
        }
    }

    pub fn url_template(&self) -> &'static str {
        match self {
            TileStyle::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileStyle::CartoDbPositron => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            TileStyle::CartoDbDarkMatter => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileStyle::OpenStreetMap => {
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            }
            TileStyle::CartoDbPositron | TileStyle::CartoDbDarkMatter => {
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>"
            }
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            TileStyle::OpenStreetMap => 19,
            TileStyle::CartoDbPositron | TileStyle::CartoDbDarkMatter => 20,
        }
    }

    pub fn subdomains(&self) -> &'static str {
        match self {
            TileStyle::OpenStreetMap => "abc",
            TileStyle::CartoDbPositron | TileStyle::CartoDbDarkMatter => "abcd",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarkerConfig {
    pub radius: f64,
    pub color: String, // Border color
    pub fill_opacity: f64,
    pub popup_width: u32,
    pub popup_height: u32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            color: "grey".to_string(),
            fill_opacity: 0.7,
            popup_width: 250,
            popup_height: 150,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub html: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: PathBuf::from("Map.html"),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_map() {
        let config = AppConfig::default();
        assert_eq!(config.input.volcanoes_csv, PathBuf::from("volcanoes_spain.txt"));
        assert_eq!(config.input.regions_geojson, PathBuf::from("world.json"));
        assert_eq!(config.output.html, PathBuf::from("Map.html"));
        assert_eq!(config.map.zoom_start, 9);
        assert_eq!(config.map.tiles, TileStyle::CartoDbPositron);
        assert_eq!(config.markers.color, "grey");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [map]
            zoom_start = 6
            tiles = "OpenStreetMap"

            [output]
            html = "out/volcanoes.html"
            "#,
        )
        .unwrap();

        assert_eq!(config.map.zoom_start, 6);
        assert_eq!(config.map.tiles, TileStyle::OpenStreetMap);
        assert_eq!(config.map.center, [41.73546232379051, 1.8283699478719764]);
        assert_eq!(config.output.html, PathBuf::from("out/volcanoes.html"));
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.markers.fill_opacity, 0.7);
    }

    #[test]
    fn unknown_tile_style_is_rejected() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
            [map]
            tiles = "Stamen Terrain"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let input = InputConfig { delimiter: '§', ..InputConfig::default() };
        assert!(input.delimiter_byte().is_err());

        let input = InputConfig { delimiter: ';', ..InputConfig::default() };
        assert_eq!(input.delimiter_byte().unwrap(), b';');
    }
}
