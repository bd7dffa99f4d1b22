//! Unit tests for the lead context.
