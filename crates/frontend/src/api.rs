use recaria_shared::config::GameConfig;
use recaria_shared::features::GeoResponse;
use recaria_shared::geo::LatLng;
use recaria_shared::models::{Discovery, PlayerState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("no browser window")]
    NoWindow,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Build the nearby-features URL. The backend names longitude `lon`.
pub fn build_geo_url(base: &str, center: LatLng, radius_m: f64) -> String {
    format!(
        "{}/api/geo/?lat={}&lon={}&radius={}",
        base, center.lat, center.lng, radius_m
    )
}

pub fn build_discovery_url(base: &str) -> String {
    format!("{}/api/discovery/", base)
}

pub fn build_bulk_discoveries_url(base: &str) -> String {
    format!("{}/api/discoveries/bulk/", base)
}

pub fn build_player_url(base: &str) -> String {
    format!("{}/api/player/", base)
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDiscoveryRequest<'a> {
    pub discoveries: &'a [Discovery],
}

fn api_base(config: &GameConfig) -> Result<String, ApiError> {
    if let Some(origin) = config.api_origin {
        return Ok(origin.to_string());
    }
    // Same origin as the page
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .ok_or(ApiError::NoWindow)
}

async fn get_json<T: DeserializeOwned>(url: String) -> Result<T, ApiError> {
    let resp = reqwest::Client::new().get(url).send().await?;
    if !resp.status().is_success() {
        return Err(ApiError::Status(resp.status().as_u16()));
    }
    Ok(resp.json().await?)
}

/// POST a JSON body; the acknowledgement body is not interpreted.
async fn post_json<B: Serialize + ?Sized>(url: String, body: &B) -> Result<(), ApiError> {
    let resp = reqwest::Client::new().post(url).json(body).send().await?;
    if !resp.status().is_success() {
        return Err(ApiError::Status(resp.status().as_u16()));
    }
    Ok(())
}

pub async fn fetch_geo(
    config: &GameConfig,
    center: LatLng,
    radius_m: f64,
) -> Result<GeoResponse, ApiError> {
    let url = build_geo_url(&api_base(config)?, center, radius_m);
    get_json(url).await
}

pub async fn post_discovery(config: &GameConfig, discovery: &Discovery) -> Result<(), ApiError> {
    post_json(build_discovery_url(&api_base(config)?), discovery).await
}

pub async fn post_bulk_discoveries(
    config: &GameConfig,
    discoveries: &[Discovery],
) -> Result<(), ApiError> {
    let body = BulkDiscoveryRequest { discoveries };
    post_json(build_bulk_discoveries_url(&api_base(config)?), &body).await
}

pub async fn fetch_player(config: &GameConfig) -> Result<PlayerState, ApiError> {
    get_json(build_player_url(&api_base(config)?)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use recaria_shared::features::Geometry;
    use recaria_shared::models::DiscoveryType;

    // --- URL builders ---

    #[test]
    fn test_build_geo_url() {
        assert_eq!(
            build_geo_url("http://localhost:8000", LatLng::new(37.031, 27.303), 150.0),
            "http://localhost:8000/api/geo/?lat=37.031&lon=27.303&radius=150"
        );
    }

    #[test]
    fn test_build_geo_url_negative_coords() {
        let url = build_geo_url("https://game.example.com", LatLng::new(-33.5, -70.25), 75.5);
        assert!(url.ends_with("?lat=-33.5&lon=-70.25&radius=75.5"), "{url}");
    }

    #[test]
    fn test_endpoint_urls() {
        let base = "https://game.example.com";
        assert_eq!(build_discovery_url(base), "https://game.example.com/api/discovery/");
        assert_eq!(
            build_bulk_discoveries_url(base),
            "https://game.example.com/api/discoveries/bulk/"
        );
        assert_eq!(build_player_url(base), "https://game.example.com/api/player/");
    }

    #[test]
    fn test_configured_origin_wins() {
        let config = GameConfig {
            api_origin: Some("https://api.example.com"),
            ..GameConfig::default()
        };
        assert_eq!(api_base(&config).unwrap(), "https://api.example.com");
    }

    // --- Request bodies ---

    #[test]
    fn test_discovery_body_shape() {
        let d = Discovery {
            lat: 37.0,
            lng: 27.0,
            name: "Market".to_string(),
            kind: DiscoveryType::Building,
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lat": 37.0, "lng": 27.0, "name": "Market",
                "type": "building", "timestamp": "2024-05-01T12:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_bulk_body_wraps_queue() {
        let queue = vec![
            Discovery {
                lat: 1.0,
                lng: 2.0,
                name: "A".to_string(),
                kind: DiscoveryType::Area,
                timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            },
            Discovery {
                lat: 3.0,
                lng: 4.0,
                name: "B".to_string(),
                kind: DiscoveryType::Road,
                timestamp: "2024-05-01T12:00:01.000Z".to_string(),
            },
        ];
        let json = serde_json::to_value(BulkDiscoveryRequest { discoveries: &queue }).unwrap();
        assert_eq!(json["discoveries"].as_array().unwrap().len(), 2);
        assert_eq!(json["discoveries"][1]["name"], "B");
        assert_eq!(json["discoveries"][1]["type"], "road");
    }

    #[test]
    fn test_bulk_body_empty() {
        let json = serde_json::to_value(BulkDiscoveryRequest { discoveries: &[] }).unwrap();
        assert_eq!(json, serde_json::json!({ "discoveries": [] }));
    }

    // --- Response deserialization ---

    #[test]
    fn test_geo_response_deserializes() {
        let json = r#"{
            "center": [37.031, 27.303],
            "radius": 150,
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "LineString", "coordinates": [[27.30, 37.03], [27.31, 37.04]]},
                 "properties": {"type": "road", "name": "Main Street"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [27.303, 37.031]},
                 "properties": {"type": "point", "name": "Well", "description": "Old well"}}
            ]
        }"#;
        let resp: GeoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.radius, Some(150.0));
        assert_eq!(resp.features.len(), 2);
        assert!(matches!(resp.features[0].geometry, Geometry::LineString { .. }));
        assert_eq!(resp.features[1].describe(), "POINT: Well - Old well");
    }

    #[test]
    fn test_geo_response_tolerates_missing_center_and_odd_geometry() {
        let json = r#"{"features": [
            {"geometry": {"type": "MultiPolygon", "coordinates": []}, "properties": null}
        ]}"#;
        let resp: GeoResponse = serde_json::from_str(json).unwrap();
        assert!(resp.center.is_none());
        assert_eq!(resp.features[0].geometry, Geometry::Unsupported);
        assert_eq!(resp.features[0].name(), "Unnamed");
    }

    #[test]
    fn test_player_response_deserializes() {
        let json = r#"{
            "player_id": "p-1", "level": 3, "score": 250, "exploration": 0,
            "inventory": [{"name": "Compass", "type": "tool"}],
            "discoveredLocations": [],
            "achievements": ["first_discovery"],
            "created_at": "2024-05-01T10:00:00Z", "last_login": "2024-05-02T10:00:00Z"
        }"#;
        let player: PlayerState = serde_json::from_str(json).unwrap();
        assert_eq!(player.level, 3);
        assert_eq!(player.inventory[0].name, "Compass");
        assert!(player.achievements.contains("first_discovery"));
        assert_eq!(player.player_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_player_response_with_missing_fields_uses_defaults() {
        let player: PlayerState = serde_json::from_str(r#"{"score": 40}"#).unwrap();
        assert_eq!(player.level, 1);
        assert_eq!(player.score, 40);
        assert!(player.discovered_locations.is_empty());
    }

    // --- Errors ---

    #[test]
    fn test_status_error_message() {
        assert_eq!(ApiError::Status(503).to_string(), "HTTP 503");
    }
}
