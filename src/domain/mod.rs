//! Core domain types and labeling logic.

pub mod price;
pub mod series;
pub mod config;
pub mod config_validation;
pub mod target;
pub mod barrier;
pub mod gate;
pub mod trade;
pub mod returns;
pub mod portfolio;
pub mod metrics;
pub mod engine;
pub mod error;
