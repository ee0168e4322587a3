//! Unit tests for the task module.

mod completion_tests;
