//! # Core Module
//!
//! This module provides the stateless building blocks of LigFilter: the ligand property
//! record, the filter criteria that select ligands by property ranges, and the I/O layer for
//! the compressed fixed-width property table.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - `Property`, `LigandRecord`, `Bounds` and `FilterCriteria`
//! - **File I/O** ([`io`]) - Reading and writing the gzip-compressed property table and
//!   importing property rows from CSV
//!
//! Nothing in this module owns ligand data for longer than a single call; ownership of the
//! loaded table belongs to [`crate::engine::store::LigandStore`].

pub mod io;
pub mod models;
