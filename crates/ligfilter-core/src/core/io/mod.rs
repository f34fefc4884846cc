//! Input/output for ligand property data.
//!
//! The property table itself is a gzip-compressed sequence of fixed-width binary records
//! (see [`property_file`]). Tabular property exports can be imported from CSV (see [`csv_import`])
//! and packed into that binary form.

pub mod csv_import;
pub mod property_file;
