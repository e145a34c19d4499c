// Presentation layer - HTTP surface over history sessions
pub mod app_state;
pub mod handlers;
pub mod router;
pub mod view_model;
