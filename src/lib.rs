//! # Flatmatch API Library
//!
//! This library provides the core functionality for the flatmatch service,
//! a flat-listing and roommate-matching REST API backed by MongoDB.

pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
