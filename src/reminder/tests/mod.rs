//! Unit tests for the reminder module.

mod service_tests;
mod support;
