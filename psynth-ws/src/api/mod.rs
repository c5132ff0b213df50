//! HTTP API handlers for psynth-ws

pub mod health;
pub mod pages;
pub mod responses;
pub mod soap;
pub mod upload;

pub use health::health_routes;
pub use pages::{edit_page, fallback};
pub use soap::service_endpoint;
pub use upload::upload;
