//! TheMealDB integration (secondary provider)
//!
//! API docs: https://www.themealdb.com/api.php

pub mod dto;
mod adapter;
mod client;

pub use client::TheMealDbClient;
