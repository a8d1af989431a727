//! Shared fixtures for gateway integration tests
#![allow(dead_code)]

pub mod mock_server;
