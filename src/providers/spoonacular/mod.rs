//! Spoonacular integration (primary provider)
//!
//! API docs: https://spoonacular.com/food-api/docs

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_RESULT_COUNT, SpoonacularClient};
