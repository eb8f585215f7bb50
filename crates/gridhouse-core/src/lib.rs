//! Core Types for GridHouse
//!
//! This crate holds the pure, dependency-light pieces shared by the storage
//! engine and the server:
//!
//! - **protocol**: the JSON messages exchanged with viewport clients
//! - **viewport**: pixel viewport → canonical slice parameters
//! - **letters**: spreadsheet-style column labels (`A, B, …, Z, AA, …`)
//!
//! Nothing in this crate touches the filesystem or the network.

pub mod letters;
pub mod protocol;
pub mod viewport;

pub use letters::{col_index_to_letters, col_letters_for_range};
pub use viewport::{compute_slice_params, SliceParams, Viewport};
