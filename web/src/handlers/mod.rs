//! HTTP handlers shared by EventHub services.

pub mod health;

pub use health::{api_health, health_check, service_banner};
