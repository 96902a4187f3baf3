//! Storage module
//!
//! Resolves user-supplied file names under the base directory and performs
//! append/read operations on the resulting files.

mod error;
mod path;
mod store;

pub use error::StorageError;
pub use store::FileStore;
