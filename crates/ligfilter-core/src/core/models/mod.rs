//! Data models shared by every layer of the library.
//!
//! - [`property`] describes the nine ligand properties and the 26-byte record layout.
//! - [`criteria`] describes the inclusive ranges a query applies to those properties.

pub mod criteria;
pub mod property;
