use shrtnr_core::GeneratorError;
use url::Url;

/// Longest tag kept in front of a generated code.
pub const MAX_TAG_LENGTH: usize = 32;

/// Derives a short human-readable tag from a URL.
///
/// For hosts starting with `www.` the tag is the second-to-last label of the
/// host (`https://www.example.com/page` gives `example`). Otherwise the last
/// path segment is split on `.` and its second-to-last part is used
/// (`https://example.com/a.b.c` gives `b`). Input without a scheme is treated
/// as a bare path and the whole of it is split on `.`, so `google.com` and
/// `google.com/search` both give `google`.
///
/// Returns `Ok(None)` when nothing usable can be derived.
pub fn domain_tag(input: &str) -> Result<Option<String>, GeneratorError> {
    let raw = match Url::parse(input) {
        Ok(url) => match url.host_str() {
            Some(host) if host.starts_with("www.") => second_to_last(host).map(sanitize),
            _ => second_to_last(url.path().rsplit('/').next().unwrap_or_default()).map(sanitize),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            second_to_last(bare_path(input)).map(sanitize)
        }
        Err(e) => return Err(GeneratorError::UrlParse(format!("'{input}': {e}"))),
    };

    Ok(raw.filter(|tag| !tag.is_empty()))
}

fn bare_path(input: &str) -> &str {
    input
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
}

fn second_to_last(s: &str) -> Option<&str> {
    let mut parts = s.rsplit('.');
    parts.next()?;
    parts.next()
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(MAX_TAG_LENGTH)
        .collect::<String>()
        .trim_matches('-')
        .to_owned()
}
