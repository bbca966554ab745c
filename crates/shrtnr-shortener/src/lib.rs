//! URL shortener service implementation.
//!
//! This crate ties a [`Generator`](shrtnr_generator::Generator) to a
//! [`Repository`](shrtnr_core::Repository). Core types are re-exported from
//! `shrtnr_core`.

pub mod service;

pub use service::{RetryPolicy, ShortenerService};
pub use shrtnr_core::{ShortCode, ShortenParams, Shortener, ShortenerError};
