//! # Formats
//!
//! On-disk formats. File I/O stays in the app layer.

pub mod persistence;

pub use persistence::{PersistenceHeader, store_from_bytes, store_to_bytes};
