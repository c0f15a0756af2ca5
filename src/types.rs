use geo::Point;
use geojson::FeatureCollection;

#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoRecord {
    pub name: String,
    pub location: String,
    pub position: Point<f64>, // x = longitude, y = latitude
    pub elevation: f64,
}

impl VolcanoRecord {
    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCategory {
    Low,
    Medium,
    High,
}

impl ColorCategory {
    pub fn color(&self) -> &'static str {
        match self {
            ColorCategory::Low => "green",
            ColorCategory::Medium => "orange",
            ColorCategory::High => "red",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircleMarker {
    pub position: Point<f64>,
    pub fill: ColorCategory,
    pub popup_html: String,
}

#[derive(Debug, Clone)]
pub struct MarkerLayer {
    pub markers: Vec<CircleMarker>,
    pub radius: f64,
    pub color: String,
    pub fill_opacity: f64,
    pub popup_width: u32,
    pub popup_height: u32,
}

/// The parsed regions, passed through untouched, with one fill per feature.
#[derive(Debug, Clone)]
pub struct RegionLayer {
    pub collection: FeatureCollection,
    pub fills: Vec<ColorCategory>,
}
