//! PDF assembly
//!
//! Two ways of producing the final document:
//!
//! - [`generate`] lays out one page per raster image, sized to the image.
//! - [`merge`] concatenates single-page PDFs printed by the browser.
//!
//! Neither touches the browser, so both are tested against files on disk.

pub mod generate;
pub mod merge;

pub use generate::{generate, generate_document};
pub use merge::{merge, MergeReport};
