//! Input check run before a URL reaches the shortener.

use std::borrow::Cow;
use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("contains whitespace")]
    Whitespace,
    #[error("contains a control character")]
    ControlCharacter,
    #[error("{0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("missing or incomplete host")]
    MissingHost,
}

/// Accepts absolute `http`/`https` URLs with a host, and scheme-less input
/// such as `google.com` whose host has at least one dot.
///
/// Nothing is fetched; reachability is not checked.
pub fn verify_url(input: &str) -> Result<Url, VerifyError> {
    if input.chars().any(char::is_whitespace) {
        return Err(VerifyError::Whitespace);
    }
    // Stored verbatim and echoed in the `Location` header.
    if input.chars().any(char::is_control) {
        return Err(VerifyError::ControlCharacter);
    }

    let has_scheme = input.contains("://");
    let candidate = if has_scheme {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("http://{input}"))
    };

    let url = Url::parse(&candidate)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(VerifyError::UnsupportedScheme(url.scheme().to_owned()));
    }

    match url.host() {
        Some(Host::Domain(domain)) if has_scheme || domain.contains('.') => Ok(url),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => Ok(url),
        _ => Err(VerifyError::MissingHost),
    }
}

/// The location a stored URL redirects to. Values without an
/// `http://` or `https://` prefix are sent to `http://`.
pub fn redirect_target(stored: &str) -> Cow<'_, str> {
    let lower = stored.get(..8).unwrap_or(stored).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Cow::Borrowed(stored)
    } else {
        Cow::Owned(format!("http://{stored}"))
    }
}
