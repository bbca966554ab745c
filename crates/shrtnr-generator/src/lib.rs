//! Short code generation.
//!
//! [`SqidsGenerator`] draws a small batch of random integers, encodes them
//! with Sqids and optionally prefixes the result with a tag derived from the
//! URL (see [`tag::domain_tag`]).

pub mod random;
pub mod tag;

pub use random::{SqidsGenerator, SqidsSettings};

use shrtnr_core::{GeneratorError, ShortCode};

/// Separator placed between a domain tag and the encoded id.
pub const TAG_SEPARATOR: char = '-';

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is not guaranteed to be unique; the caller decides
/// whether to check for collisions.
pub trait Generator: Send + Sync + 'static {
    /// Produces a candidate short code for `url`.
    fn generate(&self, url: &str, use_domain_tag: bool) -> Result<ShortCode, GeneratorError>;
}
