//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod host_fixtures;
pub mod workbook_generator;
