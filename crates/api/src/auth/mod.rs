//! Bearer credential handling.
//!
//! - [`jwt`]: access-token generation and validation.

pub mod jwt;
