#![forbid(unsafe_code)]

pub mod document;
pub mod repository;
pub mod sqlite;

pub use document::Document;
pub use repository::{Storage, StorageError};
