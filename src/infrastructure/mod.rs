// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod history_mapper;
pub mod http_repository;
