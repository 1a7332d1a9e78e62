//! Integration tests for Contact-Sweep
//!
//! These tests use wiremock to stand up small target sites and run the full
//! sweep end-to-end against a temporary SQLite database.

mod sweep_tests;
