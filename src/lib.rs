#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Authentication, per-user task storage, routing and the startup sequence"]
#![doc = "for the Todo API. The binary (`main.rs`) only loads settings and calls"]
#![doc = "[`startup::run`]."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod startup;

pub use crate::config::Config;
pub use crate::error::AppError;
