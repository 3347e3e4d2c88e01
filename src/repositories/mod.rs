//! # Repositories
//!
//! Thin collection wrappers: every method performs exactly one store
//! operation, so request failures are all-or-nothing.

pub mod flat;
pub mod user;

pub use flat::FlatRepository;
pub use user::UserRepository;
