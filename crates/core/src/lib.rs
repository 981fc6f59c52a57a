//! Core types and shared functionality for the SmartTask offline worker.
//!
//! This crate provides:
//! - Request/response model shared by the router, the strategies and the cache
//! - Cache storage with SQLite backend, organized in versioned generations
//! - The request router that picks a caching strategy per request
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod router;

pub use cache::{CacheDb, CacheGeneration, CacheStore, GenerationKind, GenerationSet};
pub use config::AppConfig;
pub use error::Error;
pub use http::{InterceptedRequest, RequestMode, Response};
pub use router::{PassThroughReason, Router, StrategyDecision};
