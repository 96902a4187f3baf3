//! Request handler module
//!
//! Request routing dispatch plus the greeting, file and vendor handlers.

pub mod files;
pub mod router;
pub mod vendor;

// Re-export main entry point
pub use router::handle_request;
