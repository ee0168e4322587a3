//! Unit tests for event envelopes, publishing, and subscriptions.
