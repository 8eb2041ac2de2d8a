//! Profile Assignment - behavioral profile assignment service
//!
//! Scores interpreted user prompts against a small catalog of predefined
//! behavioral profiles, keeps running per-(user, profile) ranking statistics,
//! and commits a profile once the evidence is strong enough. Cold-start
//! users are assigned from their first prompts; users in drift fallback are
//! re-evaluated from their recent behavior window whenever a drift event
//! arrives on the inbound stream.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
