//! Chi-Go - backend for a city guide
//!
//! Places (attractions and restaurants), user accounts, per-user checklists
//! of places, shared posts and place rankings, served over a JSON HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
