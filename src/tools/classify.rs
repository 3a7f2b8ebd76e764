//! Classification of extractor failures
//!
//! Exit codes documented by yt-dlp are checked first. Only a generic failure
//! (exit code 1, or a code missing from the table) falls through to stderr
//! inspection, which is best-effort: yt-dlp's messages are not a stable
//! interface and may change between releases. Only `ERROR:` lines are
//! inspected, since `WARNING:` lines routinely mention unrelated problems.

use crate::error::{Error, SubprocessError};
use crate::types::StreamKind;
use regex::Regex;
use std::sync::LazyLock;

/// yt-dlp exit codes with a documented meaning other than "generic error"
pub const YTDLP_EXIT_CODES: &[(i32, &str)] = &[
    (2, "usage error: invalid command-line options"),
    (100, "yt-dlp must restart to finish an update"),
    (101, "download cancelled by --max-downloads, --break-on-existing or similar"),
];

#[allow(clippy::expect_used)]
static HTTP_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HTTP Error (\d{3})").expect("valid regex"));

/// Documented meaning of a yt-dlp exit code
pub fn exit_code_meaning(exit_code: Option<i32>) -> Option<&'static str> {
    let code = exit_code?;
    YTDLP_EXIT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, meaning)| *meaning)
}

/// Map a failed extractor run to a domain error
pub fn classify_extractor_failure(
    tool: &str,
    stream: StreamKind,
    exit_code: Option<i32>,
    stderr: &str,
) -> Error {
    let meaning = exit_code_meaning(exit_code);

    let generic = || {
        Error::Subprocess(SubprocessError::NonZeroExit {
            tool: tool.to_string(),
            stream,
            exit_code,
            meaning,
            stderr: stderr.to_string(),
        })
    };

    if meaning.is_some() {
        return generic();
    }

    // Best-effort from here on.
    let errors = error_lines(stderr);
    if let Some(status) = HTTP_ERROR
        .captures(&errors)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
    {
        match status {
            404 | 410 => return Error::NotFound(stderr.to_string()),
            429 => return Error::RateLimited(stderr.to_string()),
            _ => {}
        }
    }

    let lower = errors.to_lowercase();
    if ["rate-limit", "rate limit", "too many requests"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return Error::RateLimited(stderr.to_string());
    }
    if ["no such format", "requested format is not available"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return Error::UnsupportedFormat(stderr.to_string());
    }
    if ["404", "video unavailable", "not found"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return Error::NotFound(stderr.to_string());
    }
    if lower.contains("unsupported url") {
        return Error::InvalidInput(format!("Unsupported URL: {}", stderr));
    }

    generic()
}

/// The `ERROR:` lines of yt-dlp's stderr, joined by newlines
fn error_lines(stderr: &str) -> String {
    stderr
        .lines()
        .filter(|line| line.trim_start().starts_with("ERROR:"))
        .collect::<Vec<_>>()
        .join("\n")
}
