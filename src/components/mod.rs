pub mod app;
pub mod game_card;
pub mod game_modal;
pub mod gesture_panel;
pub mod settings_modal;
pub mod status_toasts;
