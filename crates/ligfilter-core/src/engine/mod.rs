//! # Engine Module
//!
//! The in-memory analytical store and the scan that answers every query.
//!
//! ## Overview
//!
//! A [`store::LigandStore`] holds the nine property columns of the docking library. It is
//! populated once by the property table loader and then only ever read. The
//! [`scan::count_matches`] evaluator performs one full linear pass per query and returns how
//! many ligands satisfy all nine inclusive ranges.
//!
//! ## Architecture
//!
//! - **Store** ([`store`]) - Columnar ligand storage and its one-shot builder
//! - **Evaluator** ([`scan`]) - Range predicate scan and the submission threshold
//! - **Configuration** ([`config`]) - Service parameters and their builder
//! - **Progress Monitoring** ([`progress`]) - Progress events emitted while loading
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping every layer below the binary

pub mod config;
pub mod error;
pub mod progress;
pub mod scan;
pub mod store;
