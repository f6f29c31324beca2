//! Client Types
//!
//! Configuration, request, and token types.

pub mod config;
pub mod request;
pub mod token;

pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_REFRESH_PATH};
pub use request::ApiRequest;
pub use token::{RefreshRequest, TokenEnvelope, TokenEnvelopeData, TokenPair};
