//! URL validation and job identifier derivation

use crate::error::{Error, Result};
use crate::types::JobId;

/// Check a submitted URL against the domain allow-list
///
/// A single trailing slash is removed before checking. The URL must then be
/// non-empty and contain one of `allowed_domains` as a substring.
///
/// # Returns
///
/// The normalized URL (without the trailing slash), which is what the extractor
/// is invoked with.
///
/// # Examples
///
/// ```
/// use vidmux::validation::validate_url;
///
/// let allowed = vec!["youtube.com".to_string()];
/// let url = validate_url(Some("https://www.youtube.com/shorts/xyz/"), &allowed).unwrap();
/// assert_eq!(url, "https://www.youtube.com/shorts/xyz");
/// assert!(validate_url(Some("https://example.com/a"), &allowed).is_err());
/// ```
pub fn validate_url(url: Option<&str>, allowed_domains: &[String]) -> Result<String> {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err(Error::InvalidInput(
                "Invalid input. URL must be a string.".to_string(),
            ));
        }
    };

    let normalized = url.strip_suffix('/').unwrap_or(url);

    let allowed = !normalized.is_empty()
        && allowed_domains
            .iter()
            .filter(|domain| !domain.is_empty())
            .any(|domain| normalized.contains(domain.as_str()));

    if !allowed {
        return Err(Error::InvalidInput(format!(
            "Please provide a valid URL from a supported site ({})",
            allowed_domains.join(", ")
        )));
    }

    Ok(normalized.to_string())
}

/// Derive the job identifier for a normalized URL
///
/// Takes the text after the last `/`, removes every `?` and appends the
/// millisecond timestamp: `watch?v=abc123` at `1700000000000` becomes
/// `watchv=abc123-1700000000000`.
pub fn derive_job_id(normalized_url: &str, timestamp_ms: i64) -> JobId {
    let segment = normalized_url
        .rsplit_once('/')
        .map(|(_, tail)| tail)
        .unwrap_or(normalized_url);
    let sanitized: String = segment.chars().filter(|c| *c != '?').collect();
    JobId::new(format!("{}-{}", sanitized, timestamp_ms))
}
