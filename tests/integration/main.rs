//! Integration tests for Grant-Harvester
//!
//! These tests use wiremock to stand in for both the portal and the model endpoint.

mod common;
mod fallback_tests;
mod fetcher_tests;
mod harvest_tests;
