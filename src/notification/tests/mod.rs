//! Tests for the notification context.

mod consumer_tests;
