#![no_std]
pub mod errors;
pub mod types;
pub mod validation;

pub use errors::*;
pub use types::*;

// Config
/// Function name an access token must be bound to for request creation.
pub const SUBMIT_REQUEST_FN: &str = "submit_request";
/// Width of each interledger payload field (offer id and key blobs).
pub const PAYLOAD_FIELD_LEN: u32 = 32;
