//! Contact and career submission intake with a shared-secret admin moderation surface.

pub mod config;
pub mod error;
pub mod submissions;
pub mod telemetry;
