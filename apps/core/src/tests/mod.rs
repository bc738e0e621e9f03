//! Test Module
//!
//! Cross-module test suite for the helpdesk intelligence core.
//!
//! ## Test Categories
//! - `scenario_tests`: End-to-end reference tickets and reviews
//! - `property_tests`: Bounds, determinism and monotonicity over a corpus
//! - `config_tests`: Loading from files, environment and JSON overrides
//! - `service_tests`: Async service with mock collaborators

pub mod service_tests;
