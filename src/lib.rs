//! Bulk Identity Verification Service
//!
//! This library provides the core functionality for the sot-verify system,
//! which verifies batches of tenant identity records against an external
//! Source-of-Truth provider and reconciles the results back into local
//! records.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
