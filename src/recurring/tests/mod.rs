//! Tests for the recurring-task worker.
