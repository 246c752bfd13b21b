//! Common test utilities for archive resolution tests.
//!
//! - [`fixtures`] - Preference row builders and a scripted identity service

// Each test binary uses a different subset of the fixtures.
#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
