use futures::channel::mpsc::UnboundedSender;
use recaria_shared::geo::LatLng;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Position, PositionError, PositionOptions};

const WATCH_MAX_AGE_MS: u32 = 10_000;
const WATCH_TIMEOUT_MS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum GeoEvent {
    /// A position fix. `initial` is set for the one-shot request made at startup.
    Fix { at: LatLng, accuracy_m: f64, initial: bool },
    Error(String),
    Unsupported,
}

fn fix_from(position: &Position, initial: bool) -> GeoEvent {
    let coords = position.coords();
    GeoEvent::Fix {
        at: LatLng::new(coords.latitude(), coords.longitude()),
        accuracy_m: coords.accuracy(),
        initial,
    }
}

fn position_callback(
    tx: UnboundedSender<GeoEvent>,
    initial: bool,
) -> Closure<dyn FnMut(Position)> {
    Closure::new(move |position: Position| {
        let _ = tx.unbounded_send(fix_from(&position, initial));
    })
}

fn error_callback(tx: UnboundedSender<GeoEvent>) -> Closure<dyn FnMut(PositionError)> {
    Closure::new(move |error: PositionError| {
        let _ = tx.unbounded_send(GeoEvent::Error(error.message()));
    })
}

/// Ask for one position, then watch for changes. Results are sent into `tx`;
/// the callbacks stay alive for the rest of the page.
pub fn start(tx: UnboundedSender<GeoEvent>) {
    let geolocation = web_sys::window().and_then(|w| w.navigator().geolocation().ok());
    let Some(geolocation) = geolocation else {
        let _ = tx.unbounded_send(GeoEvent::Unsupported);
        return;
    };

    let on_fix = position_callback(tx.clone(), true);
    let on_error = error_callback(tx.clone());
    if let Err(e) = geolocation.get_current_position_with_error_callback(
        on_fix.as_ref().unchecked_ref(),
        Some(on_error.as_ref().unchecked_ref()),
    ) {
        let _ = tx.unbounded_send(GeoEvent::Error(format!("{e:?}")));
    }
    on_fix.forget();
    on_error.forget();

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(true);
    options.set_maximum_age(WATCH_MAX_AGE_MS);
    options.set_timeout(WATCH_TIMEOUT_MS);

    let on_watch = position_callback(tx.clone(), false);
    let on_watch_error = error_callback(tx.clone());
    match geolocation.watch_position_with_error_callback_and_options(
        on_watch.as_ref().unchecked_ref(),
        Some(on_watch_error.as_ref().unchecked_ref()),
        &options,
    ) {
        Ok(id) => tracing::debug!(watch_id = id, "watching position"),
        Err(e) => {
            let _ = tx.unbounded_send(GeoEvent::Error(format!("{e:?}")));
        }
    }
    on_watch.forget();
    on_watch_error.forget();
}
