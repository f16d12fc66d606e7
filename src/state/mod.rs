pub mod app_settings;
pub mod app_state;
pub mod board;
pub mod messages;
pub mod network;
pub mod refresher;
