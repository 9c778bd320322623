pub mod aggregator;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod data_models;
pub mod demo;
pub mod llm;
pub mod media;
pub mod providers;
