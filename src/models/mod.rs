//! Data models for the PolyRisk service.

pub mod analysis;
pub mod patient;
