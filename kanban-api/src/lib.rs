//! # Kanban API Server Library
//!
//! HTTP surface of the Kanban service: configuration, the router and its
//! auth gate, route handlers, and the JSON response envelope.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validated JSON bodies and id parsing
//! - `response`: Success envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
