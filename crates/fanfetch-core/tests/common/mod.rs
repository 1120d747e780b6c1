//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod json_server;
pub mod scripted;
