//! # Parkwise
//!
//! Parking recommendation engine.
//!
//! Given a destination address, the crate finds the known parking zones within one
//! kilometer, assesses each one (free slots from object detection, historical search
//! statistics, driving time) and recommends the best graded zone.
//!
//! ## Architecture
//!
//! - [`algorithms`]: distance, candidate filtering, grading and selection (pure)
//! - [`models`]: locations, zone records, candidates
//! - [`db`]: zone sources (CSV, in-memory) and the zone index
//! - [`adapters`]: geocoding, travel time and slot detection collaborators
//! - [`services`]: the pipeline, its worker pool and wiring
//! - [`config`]: TOML and environment configuration
//! - [`http`]: axum REST API and chat-command endpoint
//!

// Allow large error types - ParkingError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod adapters;
pub mod algorithms;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
