// Request/response models exposed by the HTTP API
pub mod admin;
pub mod auth;
