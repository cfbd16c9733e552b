use std::collections::VecDeque;

use dioxus::prelude::*;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    pub time: String,
    pub message: String,
}

/// Bounded, oldest-first message list. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl GameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn push(&mut self, time: String, message: String) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.next_id += 1;
        self.entries.push_back(LogEntry {
            id: self.next_id,
            time,
            message,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Local wall-clock time as `HH:MM:SS`.
pub fn clock_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[component]
pub fn GameLogPanel(state: AppState) -> Element {
    // Keep the newest line in view
    use_effect(move || {
        let _ = state.log.read();
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("game-log"))
        {
            el.set_scroll_top(el.scroll_height());
        }
    });

    let log = state.log.read();

    rsx! {
        div { id: "game-log", class: "game-log",
            for entry in log.entries() {
                div { key: "{entry.id}", class: "log-entry",
                    span { class: "log-time", "[{entry.time}] " }
                    "{entry.message}"
                }
            }
        }
    }
}
