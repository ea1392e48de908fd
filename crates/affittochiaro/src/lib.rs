//! Tenant CV records, completeness scoring, and the services that keep them current.

pub mod config;
pub mod cv;
pub mod error;
pub mod telemetry;
