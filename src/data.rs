use crate::types::VolcanoRecord;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::Point;
use geojson::{FeatureCollection, GeoJson};
use serde::Deserialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Deserialize)]
struct VolcanoRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Elevation (m)")]
    elevation: f64,
}

impl From<VolcanoRow> for VolcanoRecord {
    fn from(row: VolcanoRow) -> Self {
        VolcanoRecord {
            name: row.name,
            location: row.location,
            position: Point::new(row.longitude, row.latitude),
            elevation: row.elevation,
        }
    }
}

/// Reads the volcano table in file order. Any bad row fails the whole load.
pub fn load_volcanoes(path: &Path, delimiter: u8) -> Result<Vec<VolcanoRecord>> {
    info!(path = ?path, "Loading volcano table");
    let file = File::open(path)
        .with_context(|| format!("Failed to open volcano table: {:?}", path))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut volcanoes = Vec::new();
    for (i, result) in rdr.deserialize::<VolcanoRow>().enumerate() {
        // Row numbers are 1-based and skip the header
        let row = result.with_context(|| format!("Bad volcano row {} in {:?}", i + 1, path))?;
        volcanoes.push(VolcanoRecord::from(row));
    }

    info!(count = volcanoes.len(), "Loaded volcano records");
    Ok(volcanoes)
}

pub fn load_regions(path: &Path) -> Result<FeatureCollection> {
    info!(path = ?path, "Loading region GeoJSON");
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content.as_str());

    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection: {:?}", path)),
    };

    debug!(features = collection.features.len(), "Parsed region features");
    Ok(collection)
}
