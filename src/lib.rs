//! Heroes, powers, and the hero powers that join them.
//!
//! [`db::Database`] holds the model's operations; [`api`] exposes them over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
