//! Unit tests for the application pipeline.
