use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryType {
    Building,
    Road,
    Point,
    Area,
    /// Types this client does not know about survive a round-trip unchanged.
    #[serde(untagged)]
    Other(String),
}

impl DiscoveryType {
    pub fn as_str(&self) -> &str {
        match self {
            DiscoveryType::Building => "building",
            DiscoveryType::Road => "road",
            DiscoveryType::Point => "point",
            DiscoveryType::Area => "area",
            DiscoveryType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "building" => DiscoveryType::Building,
            "road" => DiscoveryType::Road,
            "point" => DiscoveryType::Point,
            "area" => DiscoveryType::Area,
            other => DiscoveryType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DiscoveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location the player has recorded. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscoveryType,
    pub timestamp: String,
}

impl Discovery {
    pub fn new(at: LatLng, name: impl Into<String>, kind: DiscoveryType, when: DateTime<Utc>) -> Self {
        Self {
            lat: at.lat,
            lng: at.lng,
            name: name.into(),
            kind,
            timestamp: when.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Everything the game knows about the player. The backend's copy replaces
/// this wholesale when it is reachable; otherwise the last local snapshot is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub level: u32,
    pub score: u32,
    pub exploration: u32,
    pub inventory: Vec<InventoryItem>,
    pub discovered_locations: Vec<Discovery>,
    pub achievements: BTreeSet<String>,
    // Bookkeeping fields the backend attaches; carried through untouched.
    #[serde(rename = "player_id", skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "last_login", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            score: 0,
            exploration: 0,
            inventory: Vec::new(),
            discovered_locations: Vec::new(),
            achievements: BTreeSet::new(),
            player_id: None,
            created_at: None,
            last_login: None,
        }
    }
}

impl PlayerState {
    /// Whether a discovery with this name and type was already recorded
    /// within `tolerance_m` of `at`.
    pub fn has_discovered(&self, name: &str, kind: &DiscoveryType, at: LatLng, tolerance_m: f64) -> bool {
        self.discovered_locations.iter().any(|d| {
            d.name == name
                && &d.kind == kind
                && crate::geo::haversine_distance(d.location(), at) <= tolerance_m
        })
    }
}
