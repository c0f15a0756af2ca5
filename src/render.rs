//! Map composition and HTML serialization.
//!
//! A [`MapDocument`] is assembled once through [`MapDocumentBuilder`] and then
//! written out as a single self-contained Leaflet page. Layer identifiers are
//! derived from layer position so the same document always serializes to the
//! same bytes.

use crate::config::{MapConfig, TileStyle};
use crate::types::{MarkerLayer, RegionLayer};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

pub const VOLCANO_LAYER: &str = "Volcanoes";
pub const POPULATION_LAYER: &str = "Population";

#[derive(Debug, Clone)]
pub struct BaseMap {
    pub center: [f64; 2],
    pub zoom_start: u8,
    pub tiles: TileStyle,
    pub title: String,
}

impl From<&MapConfig> for BaseMap {
    fn from(config: &MapConfig) -> Self {
        BaseMap {
            center: config.center,
            zoom_start: config.zoom_start,
            tiles: config.tiles,
            title: config.title.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LayerContent {
    Markers(MarkerLayer),
    Regions(RegionLayer),
}

#[derive(Debug, Clone)]
pub struct NamedLayer {
    pub name: String,
    pub content: LayerContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Toggles every named layer and lists the base tiles.
    LayerToggle,
}

#[derive(Debug, Clone)]
pub struct MapDocument {
    base: BaseMap,
    layers: Vec<NamedLayer>,
    controls: Vec<Control>,
}

pub struct MapDocumentBuilder {
    base: BaseMap,
    layers: Vec<NamedLayer>,
    controls: Vec<Control>,
}

impl MapDocumentBuilder {
    pub fn layer(mut self, name: impl Into<String>, content: LayerContent) -> Self {
        self.layers.push(NamedLayer { name: name.into(), content });
        self
    }

    pub fn control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn build(self) -> MapDocument {
        MapDocument {
            base: self.base,
            layers: self.layers,
            controls: self.controls,
        }
    }
}

/// Volcanoes first, then population regions, then the layer toggle.
pub fn compose(config: &MapConfig, markers: MarkerLayer, regions: RegionLayer) -> MapDocument {
    MapDocument::builder(BaseMap::from(config))
        .layer(VOLCANO_LAYER, LayerContent::Markers(markers))
        .layer(POPULATION_LAYER, LayerContent::Regions(regions))
        .control(Control::LayerToggle)
        .build()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions<'a> {
    attribution: &'a str,
    max_zoom: u8,
    subdomains: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CircleStyle<'a> {
    radius: f64,
    color: &'a str,
    fill: bool,
    fill_opacity: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerEntry<'a> {
    location: [f64; 2],
    fill_color: &'a str,
    popup: String,
}

impl MapDocument {
    pub fn builder(base: BaseMap) -> MapDocumentBuilder {
        MapDocumentBuilder {
            base,
            layers: Vec::new(),
            controls: Vec::new(),
        }
    }

    pub fn base(&self) -> &BaseMap {
        &self.base
    }

    pub fn layers(&self) -> &[NamedLayer] {
        &self.layers
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn to_html(&self) -> Result<String> {
        let mut script = String::new();

        script.push_str(&format!(
            "const map = L.map('map', {{center: {}, zoom: {}}});\n",
            script_json(&self.base.center)?,
            self.base.zoom_start,
        ));

        let tiles = self.base.tiles;
        script.push_str(&format!(
            "const base_tiles = L.tileLayer({}, {}).addTo(map);\n",
            script_json(&tiles.url_template())?,
            script_json(&TileOptions {
                attribution: tiles.attribution(),
                max_zoom: tiles.max_zoom(),
                subdomains: tiles.subdomains(),
            })?,
        ));

        for (i, layer) in self.layers.iter().enumerate() {
            let var = layer_var(i);
            script.push_str(&format!("\nconst {} = L.featureGroup();\n", var));
            match &layer.content {
                LayerContent::Markers(markers) => render_markers(&mut script, &var, markers)?,
                LayerContent::Regions(regions) => render_regions(&mut script, &var, regions)?,
            }
            script.push_str(&format!("{}.addTo(map);\n", var));
        }

        for control in &self.controls {
            match control {
                Control::LayerToggle => {
                    let overlays: Vec<String> = self
                        .layers
                        .iter()
                        .enumerate()
                        .map(|(i, layer)| -> Result<String> {
                            Ok(format!("{}: {}", script_json(&layer.name)?, layer_var(i)))
                        })
                        .collect::<Result<_>>()?;
                    script.push_str(&format!(
                        "\nL.control.layers({{{}: base_tiles}}, {{{}}}).addTo(map);\n",
                        script_json(&tiles.name())?,
                        overlays.join(", "),
                    ));
                }
            }
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta http-equiv="content-type" content="text/html; charset=UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no" />
  <title>{title}</title>
  <link rel="stylesheet" href="{css}" />
  <script src="{js}"></script>
  <style>
    html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
    #map {{ position: absolute; top: 0; bottom: 0; right: 0; left: 0; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
{script}  </script>
</body>
</html>
"#,
            title = escape_html(&self.base.title),
            css = LEAFLET_CSS,
            js = LEAFLET_JS,
            script = script,
        ))
    }

    /// Overwrites whatever is already at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let html = self.to_html()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            }
        }

        fs::write(path, html).with_context(|| format!("Failed to write map HTML: {:?}", path))?;
        info!(path = ?path, layers = self.layers.len(), "Saved map");
        Ok(())
    }
}

fn layer_var(index: usize) -> String {
    format!("layer_{}", index)
}

fn render_markers(script: &mut String, var: &str, layer: &MarkerLayer) -> Result<()> {
    let style = CircleStyle {
        radius: layer.radius,
        color: &layer.color,
        fill: true,
        fill_opacity: layer.fill_opacity,
    };
    let entries: Vec<MarkerEntry> = layer
        .markers
        .iter()
        .map(|marker| MarkerEntry {
            location: [marker.position.y(), marker.position.x()],
            fill_color: marker.fill.color(),
            popup: iframe(&marker.popup_html, layer.popup_width, layer.popup_height),
        })
        .collect();

    script.push_str(&format!("const {}_style = {};\n", var, script_json(&style)?));
    script.push_str(&format!("const {}_markers = {};\n", var, script_json(&entries)?));
    script.push_str(&format!(
        "for (const marker of {var}_markers) {{\n  \
         L.circleMarker(marker.location, Object.assign({{fillColor: marker.fillColor}}, {var}_style))\n    \
         .bindPopup(marker.popup, {{maxWidth: \"100%\"}})\n    \
         .addTo({var});\n}}\n",
        var = var,
    ));
    Ok(())
}

fn render_regions(script: &mut String, var: &str, layer: &RegionLayer) -> Result<()> {
    let fills: Vec<&str> = layer.fills.iter().map(|c| c.color()).collect();

    script.push_str(&format!("const {}_data = {};\n", var, script_json(&layer.collection)?));
    script.push_str(&format!("const {}_fills = {};\n", var, script_json(&fills)?));
    // Fills line up with features by index
    script.push_str(&format!(
        "{var}_data.features.forEach((feature, i) => {{\n  \
         L.geoJSON(feature, {{style: {{fillColor: {var}_fills[i]}}}}).addTo({var});\n}});\n",
        var = var,
    ));
    Ok(())
}

/// Wraps popup content in a fixed-size iframe so its markup stays isolated.
fn iframe(html: &str, width: u32, height: u32) -> String {
    format!(
        "<iframe srcdoc=\"{}\" width=\"{}\" height=\"{}\" frameborder=\"0\"></iframe>",
        escape_html(html),
        width,
        height,
    )
}

/// JSON that can sit inside a `<script>` element without closing it early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize map data")?;
    Ok(json.replace('<', "\\u003c"))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
