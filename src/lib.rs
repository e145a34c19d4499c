// Health history service - metric fetch orchestration, caching and statistics
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
