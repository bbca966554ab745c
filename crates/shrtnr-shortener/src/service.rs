use async_trait::async_trait;
use shrtnr_core::{
    Repository, ShortCode, ShortenParams, Shortener, ShortenerError, StorageError,
};
use shrtnr_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// How often a colliding code is regenerated before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
    /// Pause after the first collision, doubled after each further one.
    #[builder(default = Duration::ZERO)]
    backoff: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(1_u32.checked_shl(attempt - 1).unwrap_or(u32::MAX))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator`. Generated codes are
/// written with a create-only insert, so a collision never replaces an
/// existing mapping; the code is regenerated instead, up to the limit set by
/// the [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    retry: RetryPolicy,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode, ShortenerError> {
        let attempts = self.retry.max_attempts();

        for attempt in 1..=attempts {
            let code = self
                .generator
                .generate(&params.original_url, params.use_domain_tag)?;

            match self.repository.insert(&code, &params.original_url).await {
                Ok(()) => {
                    debug!(code = %code, attempt, "stored new mapping");
                    return Ok(code);
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(code = %code, attempt, "short code collision");
                    let delay = self.retry.delay_after(attempt);
                    if attempt < attempts && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShortenerError::ExhaustedRetries { attempts })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String, ShortenerError> {
        trace!(code = %code, "resolving short code");
        Ok(self.repository.get(code).await?)
    }

    async fn total_mappings(&self) -> Result<u64, ShortenerError> {
        Ok(self.repository.count().await?)
    }
}
