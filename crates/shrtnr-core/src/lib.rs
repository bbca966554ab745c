//! Core types and traits for the shrtnr URL shortener.
//!
//! This crate provides the shared vocabulary used by the generator, the
//! storage backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, GeneratorError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
