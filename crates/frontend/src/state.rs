use std::future::Future;

use dioxus::prelude::*;
use recaria_shared::config::GameConfig;
use recaria_shared::features::{LayerSet, LayerVisibility};
use recaria_shared::fetch::FetchTracker;
use recaria_shared::geo::{LatLng, Viewport};
use recaria_shared::models::PlayerState;

use crate::api::ApiError;
use crate::components::game_log::GameLog;
use crate::components::game_overlay::EffectLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "No Connection",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

/// Everything the page owns, as a bundle of signal handles. Cheap to copy
/// into components and event handlers; the map and game controllers are
/// `impl` blocks on this type.
#[derive(Clone, Copy, PartialEq)]
pub struct AppState {
    pub config: GameConfig,
    pub player: Signal<PlayerState>,
    pub log: Signal<GameLog>,
    pub connection: Signal<ConnectionStatus>,
    pub viewport: Signal<Viewport>,
    pub layers: Signal<LayerSet>,
    pub visibility: Signal<LayerVisibility>,
    pub fetches: Signal<FetchTracker>,
    /// Last geolocation fix, or the default center before the first one.
    pub player_position: Signal<LatLng>,
    pub effects: Signal<EffectLayer>,
}

pub fn use_app_state(config: GameConfig) -> AppState {
    AppState {
        config,
        player: use_signal(PlayerState::default),
        log: use_signal(|| GameLog::new(config.log_capacity)),
        connection: use_signal(|| ConnectionStatus::Connecting),
        viewport: use_signal(|| Viewport {
            center: config.default_center,
            zoom: config.initial_zoom,
            width: 0.0,
            height: 0.0,
        }),
        layers: use_signal(LayerSet::default),
        visibility: use_signal(LayerVisibility::default),
        fetches: use_signal(FetchTracker::default),
        player_position: use_signal(|| config.default_center),
        effects: use_signal(EffectLayer::default),
    }
}

/// Run one backend request, reporting `Connecting` before it starts and its
/// outcome once it settles.
pub async fn track_request<T>(
    mut report: impl FnMut(ConnectionStatus),
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    report(ConnectionStatus::Connecting);
    let result = request.await;
    report(match result {
        Ok(_) => ConnectionStatus::Connected,
        Err(_) => ConnectionStatus::Disconnected,
    });
    result
}

impl AppState {
    /// [`track_request`] against the connection indicator.
    pub async fn tracked<T>(
        self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        let mut connection = self.connection;
        track_request(move |status| connection.set(status), request).await
    }

    /// Append a line to the on-screen game log.
    pub fn log(mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: "game_log", "{message}");
        self.log.write().push(crate::components::game_log::clock_now(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn test_connection_labels() {
        assert_eq!(ConnectionStatus::Connecting.label(), "Connecting...");
        assert_eq!(ConnectionStatus::Connected.label(), "Connected");
        assert_eq!(ConnectionStatus::Disconnected.label(), "No Connection");
    }

    #[test]
    fn test_request_reports_connecting_then_success() {
        let mut seen = Vec::new();
        let result = block_on(track_request(|s| seen.push(s), async { Ok::<_, ApiError>(7) }));
        assert_eq!(result.unwrap(), 7);
        assert_eq!(seen, vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]);
    }

    #[test]
    fn test_request_reports_connecting_then_failure() {
        let mut seen = Vec::new();
        let result = block_on(track_request(|s| seen.push(s), async {
            Err::<(), _>(ApiError::Status(502))
        }));
        assert!(matches!(result, Err(ApiError::Status(502))));
        assert_eq!(seen, vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]);
    }

    #[test]
    fn test_connecting_is_reported_before_the_request_runs() {
        let seen = RefCell::new(Vec::new());
        let result = block_on(track_request(
            |s| seen.borrow_mut().push(s),
            async { Ok::<_, ApiError>(seen.borrow().clone()) },
        ));
        assert_eq!(result.unwrap(), vec![ConnectionStatus::Connecting]);
    }

    #[test]
    fn test_connection_classes_are_distinct() {
        let classes = [
            ConnectionStatus::Connecting.css_class(),
            ConnectionStatus::Connected.css_class(),
            ConnectionStatus::Disconnected.css_class(),
        ];
        assert_ne!(classes[0], classes[1]);
        assert_ne!(classes[1], classes[2]);
    }
}
