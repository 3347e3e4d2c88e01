//! # Data Models
//!
//! This module contains the document models stored by the flatmatch API.

pub mod flat;
pub mod user;

pub use flat::{Flat, UpdateFlat};
pub use user::{Gender, UpdateUser, User};
