//! Common library for the Platefull application
//!
//! This crate provides shared functionality used across the Platefull
//! services, including database connectivity and error handling.

pub mod database;
pub mod error;
