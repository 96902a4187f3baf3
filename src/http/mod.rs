//! HTTP protocol layer module
//!
//! Response builders and request parameter extraction, decoupled from the
//! handlers that use them.

pub mod params;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_options_response, build_text_response,
};
