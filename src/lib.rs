//! # Prometheus Save Scheduler
//!
//! A debounced, idle-aware persistence scheduler.
//!
//! Applications that keep long-lived state (sessions, workspaces, agent
//! memory) want it on disk soon after it changes, but not on every change.
//! This crate coalesces "please persist" requests into infrequent,
//! rate-limited writes and adapts the rate to whether the user is around.
//!
//! ## How a delayed save runs
//!
//! 1. `save_delayed` arms a timer for
//!    `max(last_save + interval - now, min_delay)`, where `interval` is the
//!    active or idle interval. Further requests while it is pending are
//!    coalesced.
//! 2. When the timer fires the scheduler waits for an idle slot so the write
//!    does not compete with foreground work.
//! 3. The state producer builds a snapshot, filters sanitize it, and the
//!    durable writer persists it. Subscribers get a `WriteComplete`.
//!
//! When the user comes back from being idle, a save that was scheduled with
//! the long idle interval is rescheduled against the active interval.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_save_scheduler::builders::SaverBuilder;
//! use prometheus_save_scheduler::config::SaverConfig;
//! use prometheus_save_scheduler::infra::{ActivityIdleService, AtomicFileWriter};
//!
//! let idle = ActivityIdleService::new(Duration::from_secs(1));
//! idle.spawn_monitor();
//!
//! let scheduler = SaverBuilder::new(SaverConfig::from_env()?)
//!     .with_idle_service(idle.clone())
//!     .build(|_force| Ok(session.snapshot()), AtomicFileWriter::new("session.json"))?;
//!
//! scheduler.save_delayed_default();
//! // ... on shutdown
//! scheduler.save_now().await;
//! scheduler.shutdown();
//! ```
//!
//! For complete scenarios see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions, collaborator traits, and the scheduler.
pub mod core;
/// Configuration models for save timing.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for writers, idle detection, and environment flags.
pub mod infra;
/// Runtime adapters and status surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
