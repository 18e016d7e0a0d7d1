//! Property-based testing for naming, URL resolution, and capture geometry.
//!
//! Uses proptest to generate arbitrary inputs and verify invariants that
//! must hold for every document, not just the fixtures.

use proptest::prelude::*;
use viewer_capture::source::{resolve, sanitize_identifier, SourceShape};
use viewer_capture::types::{CaptureViewport, ElementSize, ScrollMetrics};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strategy for generating document ids
pub fn arb_document_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,24}"
}

/// Strategy for generating URL slugs
pub fn arb_slug() -> impl Strategy<Value = String> {
    "[A-Za-z0-9-]{1,60}"
}

/// Strategy for generating scroll states with a non-negative top
pub fn arb_scroll_metrics() -> impl Strategy<Value = ScrollMetrics> {
    (0.0f64..50_000.0, 1.0f64..5_000.0, 0.0f64..60_000.0).prop_map(
        |(scroll_top, client_height, scroll_height)| ScrollMetrics {
            scroll_top,
            client_height,
            scroll_height,
        },
    )
}

// ============================================================================
// IDENTIFIER SANITIZING
// ============================================================================

proptest! {
    #[test]
    fn sanitized_identifier_is_a_safe_path_component(raw in ".{0,300}") {
        if let Some(id) = sanitize_identifier(&raw) {
            prop_assert!(!id.is_empty());
            prop_assert!(id.chars().count() <= 120);
            prop_assert!(id
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '.' || c == '_'));
            prop_assert!(!id.starts_with('.'));
            prop_assert!(!id.starts_with('_'));
            prop_assert!(!id.ends_with('_'));
            prop_assert!(id != "." && id != "..");
        }
    }

    #[test]
    fn sanitizing_is_idempotent(raw in ".{0,300}") {
        if let Some(id) = sanitize_identifier(&raw) {
            prop_assert_eq!(sanitize_identifier(&id), Some(id.clone()));
        }
    }

    #[test]
    fn plain_names_survive_unchanged(name in "[A-Za-z0-9][A-Za-z0-9_]{0,40}[A-Za-z0-9]") {
        prop_assume!(!name.contains("__"));
        prop_assert_eq!(sanitize_identifier(&name), Some(name.clone()));
    }
}

// ============================================================================
// URL RESOLUTION
// ============================================================================

proptest! {
    #[test]
    fn document_urls_rewrite_to_embed(id in arb_document_id(), slug in arb_slug()) {
        let src = resolve(&format!("https://docs.example.net/document/{}/{}", id, slug)).unwrap();
        prop_assert_eq!(src.embed_url, format!("https://docs.example.net/embeds/{}/content", id));
        prop_assert_eq!(src.document_id, id);
        prop_assert_eq!(src.shape, SourceShape::Document);
    }

    #[test]
    fn embed_urls_pass_through(id in arb_document_id()) {
        let url = format!("https://docs.example.net/embeds/{}/content", id);
        let src = resolve(&url).unwrap();
        prop_assert_eq!(src.embed_url, url);
        prop_assert_eq!(src.shape, SourceShape::Embed);
    }

    #[test]
    fn other_paths_are_rejected(path in "/(search|user|profile)/[a-z0-9]{1,12}") {
        let url = format!("https://docs.example.net{}", path);
        prop_assert!(resolve(&url).is_err());
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

proptest! {
    #[test]
    fn percent_is_clamped(metrics in arb_scroll_metrics()) {
        let pct = metrics.percent();
        prop_assert!(pct <= 100);
        if metrics.at_end() {
            prop_assert_eq!(pct, 100);
        }
    }

    #[test]
    fn viewport_keeps_aspect_ratio(
        width in 50.0f64..3000.0,
        height in 50.0f64..3000.0,
        target in 200.0f64..2400.0,
        scale in 1.0f64..3.0,
    ) {
        let size = ElementSize::new(width, height);
        let viewport = CaptureViewport::fit(size, target, scale);

        prop_assert_eq!(viewport.width, target);
        prop_assert!((viewport.height - target * height / width).abs() <= 0.5 + 1e-9);
        prop_assert!((viewport.scale_for(size) * width - scale * target).abs() < 1e-6);
    }
}
