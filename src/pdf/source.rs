//! Document source contract.
//!
//! The viewer only consumes these traits; anything that can open a document,
//! look up pages and paint them into a [`Surface`] can drive a session.

use super::{Locator, PdfError};
use crate::geometry::PaintTransform;
use crate::surface::Surface;
use std::future::Future;

/// Page geometry at a given zoom, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Opens documents by locator.
pub trait DocumentSource {
    type Document: DocumentHandle;

    fn open(&self, locator: &Locator) -> impl Future<Output = Result<Self::Document, PdfError>>;
}

/// A loaded document. Immutable for the lifetime of a session.
pub trait DocumentHandle {
    type Page: PageSource;

    fn page_count(&self) -> u32;

    /// Fetch a page by 1-based page number.
    fn get_page(&self, page: u32) -> impl Future<Output = Result<Self::Page, PdfError>>;
}

/// A single page that can report its size and paint itself.
pub trait PageSource {
    fn viewport(&self, scale: f32) -> Viewport;

    /// Paint into `surface`, whose backing store has already been sized for
    /// `viewport` under `transform`.
    fn paint(
        &self,
        surface: &mut Surface,
        viewport: Viewport,
        transform: Option<PaintTransform>,
    ) -> impl Future<Output = Result<(), PdfError>>;
}
