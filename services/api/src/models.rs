//! Data models for the recipe service

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;
