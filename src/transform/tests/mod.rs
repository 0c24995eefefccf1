//! Unit tests for the line transform
//!
//! Organised by pipeline stage, with the end-to-end line cases in
//! `transformer_tests`.
