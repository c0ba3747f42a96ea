//! Waveport Library
//!
//! This library exposes modules for integration testing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;
pub mod tariff;
pub mod test_utils;
