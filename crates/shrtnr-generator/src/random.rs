use crate::tag::domain_tag;
use crate::{Generator, TAG_SEPARATOR};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shrtnr_core::{GeneratorError, ShortCode};
use sqids::Sqids;
use tracing::trace;
use typed_builder::TypedBuilder;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_UPPER_BOUND: u64 = 100;

#[derive(Debug, Clone, TypedBuilder)]
/// Settings for [`SqidsGenerator`].
pub struct SqidsSettings {
    /// How many random integers are encoded into one code.
    #[builder(default = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Exclusive upper bound of every random integer.
    #[builder(default = DEFAULT_UPPER_BOUND)]
    upper_bound: u64,
    /// Minimum length of the encoded part of a code.
    #[builder(default = 0)]
    min_length: u8,
    /// Fixed seed for reproducible output. Seeded from the OS when absent.
    #[builder(default, setter(strip_option))]
    seed: Option<u64>,
}

impl Default for SqidsSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Generates codes by encoding a batch of random integers with Sqids.
///
/// The random source is a `StdRng`, a cryptographically secure generator,
/// so codes cannot be predicted from earlier ones.
pub struct SqidsGenerator {
    sqids: Sqids,
    rng: Mutex<StdRng>,
    batch_size: usize,
    upper_bound: u64,
}

impl SqidsGenerator {
    pub fn new(settings: SqidsSettings) -> Result<Self, GeneratorError> {
        if settings.batch_size == 0 {
            return Err(GeneratorError::Encoding(
                "batch size must be at least 1".to_string(),
            ));
        }
        if settings.upper_bound == 0 {
            return Err(GeneratorError::Encoding(
                "upper bound must be at least 1".to_string(),
            ));
        }

        let sqids = Sqids::builder()
            .min_length(settings.min_length)
            .build()
            .map_err(|e| GeneratorError::Encoding(e.to_string()))?;

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            sqids,
            rng: Mutex::new(rng),
            batch_size: settings.batch_size,
            upper_bound: settings.upper_bound,
        })
    }

    fn draw(&self) -> Vec<u64> {
        let mut rng = self.rng.lock();
        (0..self.batch_size)
            .map(|_| rng.random_range(0..self.upper_bound))
            .collect()
    }

    fn encode(&self, numbers: &[u64]) -> Result<String, GeneratorError> {
        self.sqids
            .encode(numbers)
            .map_err(|e| GeneratorError::Encoding(e.to_string()))
    }
}

impl std::fmt::Debug for SqidsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqidsGenerator")
            .field("batch_size", &self.batch_size)
            .field("upper_bound", &self.upper_bound)
            .finish_non_exhaustive()
    }
}

impl Generator for SqidsGenerator {
    fn generate(&self, url: &str, use_domain_tag: bool) -> Result<ShortCode, GeneratorError> {
        let encoded = self.encode(&self.draw())?;

        let tag = if use_domain_tag { domain_tag(url)? } else { None };
        let code = match tag {
            Some(tag) => format!("{tag}{TAG_SEPARATOR}{encoded}"),
            None => encoded,
        };

        trace!(code = %code, "generated short code");
        ShortCode::new(&code).map_err(|e| GeneratorError::Encoding(e.to_string()))
    }
}
