#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Domain models, repositories, use-cases, authentication and routing for the"]
#![doc = "task management API. The binary (`main.rs`) reads the configuration, builds"]
#![doc = "the [`app::Services`] and serves them with actix-web."]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod usecases;

pub use app::Services;
pub use error::{AppError, ServiceError};
