use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::{haversine_distance, LatLng};
use crate::models::DiscoveryType;

/// GeoJSON `[lng, lat]` pair.
pub type Position = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    Point { coordinates: Position },
    /// MultiPolygon and friends: parsed so the response still decodes, never drawn.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFeature {
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FeatureProperties,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `GET /api/geo/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResponse {
    /// `[lat, lon]`, as the backend echoes it.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    #[serde(default)]
    pub radius: Option<f64>,
    pub features: Vec<MapFeature>,
}

/// The three toggleable overlay groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureLayer {
    Buildings,
    Roads,
    Points,
}

impl FeatureLayer {
    pub const ALL: [FeatureLayer; 3] = [FeatureLayer::Buildings, FeatureLayer::Roads, FeatureLayer::Points];

    pub fn label(self) -> &'static str {
        match self {
            FeatureLayer::Buildings => "Buildings",
            FeatureLayer::Roads => "Roads",
            FeatureLayer::Points => "Points of Interest",
        }
    }

    /// Id of the checkbox that toggles this layer.
    pub fn toggle_id(self) -> &'static str {
        match self {
            FeatureLayer::Buildings => "toggle-buildings",
            FeatureLayer::Roads => "toggle-roads",
            FeatureLayer::Points => "toggle-points",
        }
    }
}

impl MapFeature {
    pub fn new(geometry: Geometry, kind: &str, name: &str, description: Option<&str>) -> Self {
        Self {
            geometry,
            properties: FeatureProperties {
                kind: Some(kind.to_string()),
                name: Some(name.to_string()),
                description: description.map(str::to_string),
            },
        }
    }

    /// Which overlay layer draws this feature. Lines are roads, polygons are
    /// buildings, points are points of interest.
    pub fn layer(&self) -> Option<FeatureLayer> {
        match self.geometry {
            Geometry::LineString { .. } => Some(FeatureLayer::Roads),
            Geometry::Polygon { .. } => Some(FeatureLayer::Buildings),
            Geometry::Point { .. } => Some(FeatureLayer::Points),
            Geometry::Unsupported => None,
        }
    }

    pub fn name(&self) -> &str {
        self.properties.name.as_deref().unwrap_or("Unnamed")
    }

    /// Game-log line for a clicked feature, e.g. `"POINT: Lighthouse - Old signal tower"`.
    pub fn describe(&self) -> String {
        let kind = self.properties.kind.as_deref().unwrap_or("unknown");
        let mut message = format!("{}: {}", kind.to_uppercase(), self.name());
        if let Some(desc) = self.properties.description.as_deref().filter(|d| !d.is_empty()) {
            message.push_str(" - ");
            message.push_str(desc);
        }
        message
    }

    /// Discovery type recorded when the feature is visited. Falls back to the
    /// layer when the properties carry no type.
    pub fn discovery_type(&self) -> DiscoveryType {
        match (self.properties.kind.as_deref(), self.layer()) {
            (Some(kind), _) => DiscoveryType::parse(kind),
            (None, Some(FeatureLayer::Roads)) => DiscoveryType::Road,
            (None, Some(FeatureLayer::Buildings)) => DiscoveryType::Building,
            (None, Some(FeatureLayer::Points)) => DiscoveryType::Point,
            (None, None) => DiscoveryType::Area,
        }
    }

    /// Representative location: the point itself, the middle vertex of a
    /// line, or the vertex average of a polygon's outer ring.
    pub fn anchor(&self) -> Option<LatLng> {
        match &self.geometry {
            Geometry::Point { coordinates } => Some(LatLng::from_position(*coordinates)),
            Geometry::LineString { coordinates } => {
                coordinates.get(coordinates.len() / 2).copied().map(LatLng::from_position)
            }
            Geometry::Polygon { coordinates } => {
                let ring = coordinates.first()?;
                // Closed rings repeat the first vertex at the end
                let open = match (ring.first(), ring.last()) {
                    (Some(a), Some(b)) if ring.len() > 1 && a == b => &ring[..ring.len() - 1],
                    _ => &ring[..],
                };
                if open.is_empty() {
                    return None;
                }
                let n = open.len() as f64;
                let lng = open.iter().map(|p| p[0]).sum::<f64>() / n;
                let lat = open.iter().map(|p| p[1]).sum::<f64>() / n;
                Some(LatLng::new(lat, lng))
            }
            Geometry::Unsupported => None,
        }
    }
}

/// The rendered overlay: one list per layer. Always rebuilt from a complete
/// feature set, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSet {
    pub buildings: Vec<MapFeature>,
    pub roads: Vec<MapFeature>,
    pub points: Vec<MapFeature>,
}

impl LayerSet {
    pub fn from_features(features: Vec<MapFeature>) -> Self {
        let mut set = LayerSet::default();
        for feature in features {
            match feature.layer() {
                Some(FeatureLayer::Buildings) => set.buildings.push(feature),
                Some(FeatureLayer::Roads) => set.roads.push(feature),
                Some(FeatureLayer::Points) => set.points.push(feature),
                None => {}
            }
        }
        set
    }

    pub fn layer(&self, layer: FeatureLayer) -> &[MapFeature] {
        match layer {
            FeatureLayer::Buildings => &self.buildings,
            FeatureLayer::Roads => &self.roads,
            FeatureLayer::Points => &self.points,
        }
    }

    pub fn len(&self) -> usize {
        self.buildings.len() + self.roads.len() + self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Features of every switched-on layer, tagged with their layer.
    pub fn visible(
        &self,
        visibility: LayerVisibility,
    ) -> impl Iterator<Item = (FeatureLayer, &MapFeature)> + '_ {
        FeatureLayer::ALL
            .into_iter()
            .filter(move |layer| visibility.is_visible(*layer))
            .flat_map(move |layer| self.layer(layer).iter().map(move |f| (layer, f)))
    }

    /// The visible feature whose anchor is closest to `at`, if any lies
    /// within `range_m`.
    pub fn nearest_visible(
        &self,
        at: LatLng,
        visibility: LayerVisibility,
        range_m: f64,
    ) -> Option<&MapFeature> {
        self.visible(visibility)
            .filter_map(|(_, f)| Some((f, haversine_distance(at, f.anchor()?))))
            .filter(|(_, d)| *d <= range_m)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }
}

/// Which layers are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub buildings: bool,
    pub roads: bool,
    pub points: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            buildings: true,
            roads: true,
            points: true,
        }
    }
}

impl LayerVisibility {
    pub fn is_visible(&self, layer: FeatureLayer) -> bool {
        match layer {
            FeatureLayer::Buildings => self.buildings,
            FeatureLayer::Roads => self.roads,
            FeatureLayer::Points => self.points,
        }
    }

    pub fn set(&mut self, layer: FeatureLayer, visible: bool) {
        match layer {
            FeatureLayer::Buildings => self.buildings = visible,
            FeatureLayer::Roads => self.roads = visible,
            FeatureLayer::Points => self.points = visible,
        }
    }
}
