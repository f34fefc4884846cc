//! # Query Relay Protocol
//!
//! Message passing between the owner process, which holds the [`LigandStore`] and performs
//! every scan, and the worker processes, which accept external requests but hold no ligand
//! data.
//!
//! ## Transport
//!
//! Each worker is a child process of the owner. Its stdin carries owner-to-worker messages
//! and its stdout carries worker-to-owner messages, one JSON document per line
//! ([`codec`]). The pipe pair is the worker's channel: a reply always travels back on the
//! channel its request arrived on.
//!
//! ## Pairing
//!
//! Every [`message::QueryRequest`] carries a worker-local id that the owner echoes in the
//! matching [`message::QueryResponse`]. A worker may therefore keep any number of queries in
//! flight on one channel without misattributing answers.
//!
//! - **Owner side** ([`owner`]) - the scan thread and the per-worker channel tasks
//! - **Worker side** ([`worker`]) - the client that suspends each caller until its reply arrives
//!
//! [`LigandStore`]: crate::engine::store::LigandStore

pub mod codec;
pub mod error;
pub mod message;
pub mod owner;
pub mod worker;
