//! Test utilities for Foodgram services.
//!
//! Provides `MockAuth` identity headers and the JSON fixture loader.
//! Import from tests and dev-dependencies only, never in production code.

pub mod auth;
pub mod fixture;
