pub mod controls;
pub mod game_log;
pub mod game_overlay;
pub mod hud;
pub mod map_view;
