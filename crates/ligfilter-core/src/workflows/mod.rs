//! # Workflows Module
//!
//! High-level entry points that wire the loader, the store, the relay and the supervisor
//! together. A binary needs nothing below this layer.
//!
//! - **Serve Workflow** ([`serve`]) - Loads the property table, becomes the owner of the
//!   store, and supervises the worker pool until shutdown.
//! - **Count Workflow** ([`count`]) - Loads the table and answers a single query in-process,
//!   without any worker processes.

pub mod count;
pub mod serve;
