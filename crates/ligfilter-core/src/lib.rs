//! # LigFilter Core Library
//!
//! An in-memory analytical store for docking-library ligand properties, together with the
//! cross-process protocol used to query it from a pool of stateless worker processes.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict separation between the data, the process that owns it, and
//! the processes that merely relay questions to it.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`LigandRecord`, `FilterCriteria`)
//!   and the I/O for the fixed-width, gzip-compressed property table.
//!
//! - **[`engine`]: The Store.** The columnar `LigandStore` and the range predicate scan that
//!   counts matching ligands. The store is loaded once and never mutated afterwards.
//!
//! - **[`relay`]: The Protocol.** Newline-delimited JSON messages between the owner process,
//!   which holds the store and performs every scan, and the worker processes, which hold no
//!   ligand data at all.
//!
//! - **[`supervisor`]: The Pool.** Launches one worker per processing unit and replaces any
//!   worker that exits, keeping the pool at its configured size.
//!
//! - **[`workflows`]: The Public API.** Ties the layers together into the two entry points a
//!   binary needs: serving as the owner of a worker pool, and a one-shot in-process count.

pub mod core;
pub mod engine;
pub mod relay;
pub mod supervisor;
pub mod workflows;
