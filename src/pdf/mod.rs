//! PDF document source.
//!
//! This module provides:
//! - The document source contract consumed by the render scheduler
//! - Locator parsing for paths, `file://` URLs and remote `http(s)://` URLs
//! - A PDFium-backed implementation with high-DPI aware painting

mod locator;
mod renderer;
mod source;

pub use locator::*;
pub use renderer::*;
pub use source::*;
