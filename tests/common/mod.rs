//! Shared test utilities for wpick integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fake_wp_api;
pub mod fixtures;

pub use builders::*;
pub use fake_wp_api::*;
pub use fixtures::*;
