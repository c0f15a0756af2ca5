pub mod types;
pub mod config;
pub mod data;
pub mod processing;
pub mod render;

use anyhow::Result;
use crate::config::AppConfig;
use std::path::PathBuf;
use tracing::info;

/// Loads both inputs, builds the two layers and writes the map. Returns the
/// path of the written HTML file.
pub fn run(config: &AppConfig) -> Result<PathBuf> {
    // 1. Load Data
    let delimiter = config.input.delimiter_byte()?;
    let volcanoes = data::load_volcanoes(&config.input.volcanoes_csv, delimiter)?;
    let regions = data::load_regions(&config.input.regions_geojson)?;

    // 2. Classify and build layers
    let markers = processing::build_marker_layer(&volcanoes, &config.markers);
    let regions = processing::build_region_layer(regions)?;

    // 3. Compose and save
    let map = render::compose(&config.map, markers, regions);
    map.save(&config.output.html)?;

    info!(path = ?config.output.html, "Generation complete");
    Ok(config.output.html.clone())
}
