use dioxus::prelude::*;
use futures::StreamExt;

use crate::browser;
use crate::state::AppState;

/// "explode" click sprite: 16 frames at 20 fps.
const EXPLODE_FRAMES: u32 = 16;
const EXPLODE_FPS: u32 = 20;

const POPUP_FADE_MS: u32 = 1_000;
const POPUP_HOLD_MS: u32 = 2_000;

pub const fn explode_duration_ms() -> u32 {
    EXPLODE_FRAMES * 1_000 / EXPLODE_FPS
}

pub const fn popup_duration_ms() -> u32 {
    POPUP_FADE_MS + POPUP_HOLD_MS + POPUP_FADE_MS
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickEffect {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AchievementPopup {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub points: u32,
}

/// Transient sprites drawn over the whole viewport. Each one removes itself
/// by id once its animation finishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectLayer {
    next_id: u64,
    pub clicks: Vec<ClickEffect>,
    pub popups: Vec<AchievementPopup>,
    pub width: f64,
    pub height: f64,
}

impl EffectLayer {
    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn spawn_click(&mut self, x: f64, y: f64) -> u64 {
        let id = self.issue_id();
        self.clicks.push(ClickEffect { id, x, y });
        id
    }

    pub fn remove_click(&mut self, id: u64) {
        self.clicks.retain(|c| c.id != id);
    }

    pub fn show_popup(&mut self, title: &str, description: &str, points: u32) -> u64 {
        let id = self.issue_id();
        self.popups.push(AchievementPopup {
            id,
            title: title.to_string(),
            description: description.to_string(),
            points,
        });
        id
    }

    pub fn remove_popup(&mut self, id: u64) {
        self.popups.retain(|p| p.id != id);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[component]
pub fn GameOverlay(state: AppState) -> Element {
    let mut effects = state.effects;

    // Window resize events arrive from outside the runtime
    let resize = use_coroutine(move |mut rx: UnboundedReceiver<()>| async move {
        while rx.next().await.is_some() {
            state.on_resize();
        }
    });
    use_hook(move || browser::on_window_resize(resize.tx()));
    use_effect(move || state.on_resize());

    let layer = effects.read();
    let size_style = format!("width: {}px; height: {}px;", layer.width, layer.height);
    let explode_ms = explode_duration_ms();
    let popup_ms = popup_duration_ms();

    rsx! {
        div { class: "game-overlay", style: "{size_style}",
            for click in layer.clicks.iter() {
                div {
                    key: "click-{click.id}",
                    class: "click-effect",
                    style: "left: {click.x}px; top: {click.y}px; animation-duration: {explode_ms}ms;",
                    onanimationend: {
                        let id = click.id;
                        move |_| effects.write().remove_click(id)
                    },
                }
            }
            for popup in layer.popups.iter() {
                div {
                    key: "popup-{popup.id}",
                    class: "achievement-popup",
                    style: "animation-duration: {popup_ms}ms;",
                    onanimationend: {
                        let id = popup.id;
                        move |_| effects.write().remove_popup(id)
                    },
                    div { class: "achievement-title", "Achievement Unlocked!" }
                    div { class: "achievement-name", "{popup.title}" }
                    div { class: "achievement-description", "{popup.description}" }
                    div { class: "achievement-points", "+{popup.points} points" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(explode_duration_ms(), 800);
        assert_eq!(popup_duration_ms(), 4_000);
    }

    #[test]
    fn test_click_effects_removed_by_id() {
        let mut layer = EffectLayer::default();
        let a = layer.spawn_click(10.0, 20.0);
        let b = layer.spawn_click(30.0, 40.0);
        assert_ne!(a, b);
        layer.remove_click(a);
        assert_eq!(layer.clicks, vec![ClickEffect { id: b, x: 30.0, y: 40.0 }]);
        // removing twice is a no-op
        layer.remove_click(a);
        assert_eq!(layer.clicks.len(), 1);
    }

    #[test]
    fn test_popups_removed_by_id() {
        let mut layer = EffectLayer::default();
        let first = layer.show_popup("Road Master", "You discovered 5 roads!", 75);
        let second = layer.show_popup("First Discovery", "You discovered your first location!", 50);
        layer.remove_popup(first);
        assert_eq!(layer.popups.len(), 1);
        assert_eq!(layer.popups[0].id, second);
        assert_eq!(layer.popups[0].points, 50);
    }

    #[test]
    fn test_ids_are_shared_across_kinds() {
        let mut layer = EffectLayer::default();
        let click = layer.spawn_click(0.0, 0.0);
        let popup = layer.show_popup("t", "d", 1);
        assert_ne!(click, popup);
        layer.remove_popup(click);
        assert_eq!(layer.popups.len(), 1);
    }

    #[test]
    fn test_resize() {
        let mut layer = EffectLayer::default();
        layer.resize(1280.0, 720.0);
        assert_eq!((layer.width, layer.height), (1280.0, 720.0));
    }
}
