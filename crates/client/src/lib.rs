//! Worker-side code for the SmartTask offline cache.
//!
//! This crate provides the network fetch pipeline, the cache generation
//! manager, the caching strategies, and the `ServiceWorker` object whose
//! handler methods a host runtime binds its events to.

pub mod fetch;
pub mod generations;
pub mod pending;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{Connectivity, FetchClient, FetchConfig, Fetcher};
pub use generations::GenerationManager;
pub use pending::PendingWork;
pub use strategy::{FetchOutcome, ResponseSource, Served, Strategies};
pub use worker::{
    BackgroundHooks, ClientMessage, Clients, LoggingHooks, Notification, NotificationAction, ServiceWorker,
    WorkerMessage, WorkerState,
};
