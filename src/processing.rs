use crate::config::MarkerConfig;
use crate::render::escape_html;
use crate::types::{CircleMarker, ColorCategory, MarkerLayer, RegionLayer, VolcanoRecord};
use anyhow::{anyhow, Result};
use geojson::FeatureCollection;
use tracing::info;

pub const POPULATION_PROPERTY: &str = "POP2005";

/// Elevation in metres. NaN fails both lower bounds and lands in `High`.
pub fn elevation_category(elevation: f64) -> ColorCategory {
    if elevation < 1000.0 {
        ColorCategory::Low
    } else if elevation < 3000.0 {
        ColorCategory::Medium
    } else {
        ColorCategory::High
    }
}

pub fn population_category(population: f64) -> ColorCategory {
    if population < 10_000_000.0 {
        ColorCategory::Low
    } else if population < 20_000_000.0 {
        ColorCategory::Medium
    } else {
        ColorCategory::High
    }
}

pub fn popup_html(volcano: &VolcanoRecord) -> String {
    format!(
        "<h4>Volcano information:</h4>\n\
         <strong>Name:</strong> {}<br>\n\
         <strong>Location:</strong> {}<br>\n\
         <strong>Height:</strong> {} m",
        escape_html(&volcano.name),
        escape_html(&volcano.location),
        volcano.elevation,
    )
}

pub fn build_marker_layer(volcanoes: &[VolcanoRecord], style: &MarkerConfig) -> MarkerLayer {
    let markers: Vec<CircleMarker> = volcanoes
        .iter()
        .map(|volcano| CircleMarker {
            position: volcano.position,
            fill: elevation_category(volcano.elevation),
            popup_html: popup_html(volcano),
        })
        .collect();

    info!(markers = markers.len(), "Built volcano markers");

    MarkerLayer {
        markers,
        radius: style.radius,
        color: style.color.clone(),
        fill_opacity: style.fill_opacity,
        popup_width: style.popup_width,
        popup_height: style.popup_height,
    }
}

/// Colors every feature by its population. A feature without a numeric
/// population aborts the build.
pub fn build_region_layer(collection: FeatureCollection) -> Result<RegionLayer> {
    let fills = collection
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| -> Result<ColorCategory> {
            let population = feature
                .property(POPULATION_PROPERTY)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| anyhow!("Region feature {} has no numeric {} property", i, POPULATION_PROPERTY))?;
            Ok(population_category(population))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(features = fills.len(), "Styled population regions");

    Ok(RegionLayer { collection, fills })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use geojson::{Feature, JsonObject};
    use serde_json::json;

    fn volcano(name: &str, location: &str, elevation: f64) -> VolcanoRecord {
        VolcanoRecord {
            name: name.to_string(),
            location: location.to_string(),
            position: Point::new(-16.6424, 28.2727),
            elevation,
        }
    }

    fn region(population: serde_json::Value) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert(POPULATION_PROPERTY.to_string(), population);
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn elevation_boundaries() {
        assert_eq!(elevation_category(-50.0), ColorCategory::Low);
        assert_eq!(elevation_category(999.999), ColorCategory::Low);
        assert_eq!(elevation_category(1000.0), ColorCategory::Medium);
        assert_eq!(elevation_category(2999.999), ColorCategory::Medium);
        assert_eq!(elevation_category(3000.0), ColorCategory::High);
        assert_eq!(elevation_category(8848.0), ColorCategory::High);
    }

    #[test]
    fn population_boundaries() {
        assert_eq!(population_category(9_999_999.0).color(), "green");
        assert_eq!(population_category(10_000_000.0).color(), "orange");
        assert_eq!(population_category(19_999_999.0).color(), "orange");
        assert_eq!(population_category(20_000_000.0).color(), "red");
    }

    #[test]
    fn one_marker_per_record_with_matching_fill() {
        let volcanoes = vec![
            volcano("Teide", "Tenerife", 3715.0),
            volcano("Croscat", "Garrotxa", 789.0),
            volcano("Pico Viejo", "Tenerife", 3135.0),
            volcano("Montaña Blanca", "Tenerife", 2748.0),
        ];

        let layer = build_marker_layer(&volcanoes, &MarkerConfig::default());

        assert_eq!(layer.markers.len(), volcanoes.len());
        for (marker, volcano) in layer.markers.iter().zip(&volcanoes) {
            assert_eq!(marker.fill, elevation_category(volcano.elevation));
            assert_eq!(marker.position, volcano.position);
            assert!(marker.popup_html.contains(&volcano.name));
            assert!(marker.popup_html.contains(&volcano.location));
            assert!(marker.popup_html.contains(&volcano.elevation.to_string()));
        }
        assert_eq!(layer.radius, 6.0);
        assert_eq!(layer.color, "grey");
        assert_eq!(layer.fill_opacity, 0.7);
    }

    #[test]
    fn popup_shows_whole_metres_without_decimals() {
        let html = popup_html(&volcano("Teide", "Tenerife", 3715.0));
        assert!(html.contains("<strong>Height:</strong> 3715 m"));
    }

    #[test]
    fn popup_escapes_markup_in_fields() {
        let html = popup_html(&volcano("<script>alert(1)</script>", "Tom & Jerry's", 10.0));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; Jerry&#39;s"));
    }

    #[test]
    fn regions_styled_independent_of_order() {
        let features = vec![
            region(json!(5_000_000)),
            region(json!(15_000_000)),
            region(json!(1_300_000_000)),
        ];
        let layer = build_region_layer(collection(features.clone())).unwrap();
        assert_eq!(
            layer.fills,
            vec![ColorCategory::Low, ColorCategory::Medium, ColorCategory::High]
        );

        let reversed: Vec<Feature> = features.into_iter().rev().collect();
        let layer = build_region_layer(collection(reversed)).unwrap();
        assert_eq!(
            layer.fills,
            vec![ColorCategory::High, ColorCategory::Medium, ColorCategory::Low]
        );
    }

    #[test]
    fn missing_population_is_an_error() {
        let mut without = region(json!(0));
        without.properties = Some(JsonObject::new());
        let err = build_region_layer(collection(vec![region(json!(1)), without])).unwrap_err();
        assert!(err.to_string().contains("Region feature 1"));
    }

    #[test]
    fn non_numeric_population_is_an_error() {
        assert!(build_region_layer(collection(vec![region(json!("lots"))])).is_err());
        assert!(build_region_layer(collection(vec![region(serde_json::Value::Null)])).is_err());
    }
}
