//! HTTP handlers

pub mod health;
pub mod metrics;
pub mod stops;
pub mod insights;
pub mod predict;
pub mod snapshot;
