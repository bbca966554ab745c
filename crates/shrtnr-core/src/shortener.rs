use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenParams {
    /// The original URL to be shortened. Expected to be validated already.
    pub original_url: String,
    /// Prefix the code with a tag derived from the URL's host or path.
    #[serde(default)]
    pub use_domain_tag: bool,
}

impl ShortenParams {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            use_domain_tag: false,
        }
    }

    pub fn with_domain_tag(mut self, use_domain_tag: bool) -> Self {
        self.use_domain_tag = use_domain_tag;
        self
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns the generated short code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Resolves a short code to the URL it was created for.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns how many mappings exist.
    async fn total_mappings(&self) -> Result<u64>;
}
