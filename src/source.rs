//! Source URL resolution and output naming
//!
//! Two URL shapes are accepted:
//!
//! ```text
//! https://<host>/document/<id>/<slug>   -> rewritten to the embed form
//! https://<host>/embeds/<id>/content    -> used unchanged
//! ```
//!
//! Anything else is rejected before a browser is touched.

use crate::error::SourceError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const MAX_IDENTIFIER_LEN: usize = 120;

fn document_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/(?:doc|document)/([A-Za-z0-9]+)(?:/[^/]*)?/?$").expect("static regex")
    })
}

fn embed_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/embeds/([A-Za-z0-9]+)/content/?$").expect("static regex"))
}

/// Which shape the caller supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// Public document page
    Document,
    /// Canonical embed URL
    Embed,
}

/// A validated source, ready for navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Canonical embed URL
    pub embed_url: String,
    /// Alphanumeric document id as it appears in the URL
    pub document_id: String,
    /// Shape of the original input
    pub shape: SourceShape,
}

/// Resolve `input` to its canonical embed URL
pub fn resolve(input: &str) -> Result<ResolvedSource, SourceError> {
    let trimmed = input.trim();
    let url =
        Url::parse(trimmed).map_err(|e| SourceError::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceError::UnrecognizedShape(trimmed.to_string()));
    }
    let host = url
        .host_str()
        .ok_or_else(|| SourceError::InvalidUrl(trimmed.to_string()))?;

    if embed_path().is_match(url.path()) {
        let document_id = capture_id(embed_path(), url.path())
            .ok_or_else(|| SourceError::MissingId(trimmed.to_string()))?;
        return Ok(ResolvedSource {
            embed_url: trimmed.to_string(),
            document_id,
            shape: SourceShape::Embed,
        });
    }

    if document_path().is_match(url.path()) {
        let document_id = capture_id(document_path(), url.path())
            .ok_or_else(|| SourceError::MissingId(trimmed.to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        return Ok(ResolvedSource {
            embed_url: format!("https://{authority}/embeds/{document_id}/content"),
            document_id,
            shape: SourceShape::Document,
        });
    }

    Err(SourceError::UnrecognizedShape(trimmed.to_string()))
}

fn capture_id(re: &Regex, path: &str) -> Option<String> {
    re.captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Make `raw` safe to use as a single path component
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_identifier(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '.' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    let edge = |c: char| c == '.' || c == '-' || c == '_';
    let capped: String = out.trim_matches(edge).chars().take(MAX_IDENTIFIER_LEN).collect();
    let trimmed = capped.trim_end_matches(edge).to_string();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
