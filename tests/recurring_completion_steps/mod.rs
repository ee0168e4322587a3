//! Step definitions for recurring completion scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
