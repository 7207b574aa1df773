pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod moderation;
pub mod repository;
pub mod telemetry;
pub mod threads;
pub mod utils;
