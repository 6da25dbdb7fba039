//! HTTP API: guard middleware, demo sub-applications, and response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
