use std::sync::Arc;

use shrtnr_core::{ShortCode, Shortener};

/// Path segment under which short codes are served.
pub const REDIRECT_PREFIX: &str = "r";

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    root_url: String,
    use_domain_tag: bool,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        root_url: impl Into<String>,
        use_domain_tag: bool,
    ) -> Self {
        Self {
            shortener,
            root_url: root_url.into(),
            use_domain_tag,
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn use_domain_tag(&self) -> bool {
        self.use_domain_tag
    }

    /// The public link for `code`, e.g. `http://localhost:8000/r/86Rf07`.
    pub fn short_url(&self, code: &ShortCode) -> String {
        let base = format!(
            "{}/{}",
            self.root_url.trim_end_matches('/'),
            REDIRECT_PREFIX
        );
        code.to_url(&base)
    }
}
