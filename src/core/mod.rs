//! Core Components
//!
//! Core infrastructure shared by every request pipeline.

pub mod transport;

pub use transport::*;
