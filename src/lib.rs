//! Pulse Backoffice console library
//!
//! Carries everything the console binary (or any other shell) needs to
//! manage customer records against the Pulse REST backend: data models and
//! field validation, progressive input masking, the telemetry layer
//! (bounded event log, failure classification, notification sink), the
//! REST client, configuration, and local session persistence.

pub mod api;
pub mod cli;
pub mod config;
pub mod input;
pub mod models;
pub mod store;
pub mod telemetry;
