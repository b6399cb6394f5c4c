//! Core domain types and logic.

pub mod panel;
pub mod stats;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod screen;
pub mod config_validation;
pub mod error;
