//! PDFium-backed document source.
//!
//! Note: pdfium-render's Pdfium struct is not Send+Sync, so we bind an
//! instance on-demand inside each blocking task rather than storing one in
//! the document handle. The handle keeps the raw bytes and reloads from them
//! for each paint. Page sizes are read once, when the document is opened.

use super::{DocumentHandle, DocumentSource, Locator, PageSource, Viewport};
use crate::geometry::PaintTransform;
use crate::surface::Surface;
use log::{debug, info, warn};
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during PDF operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to initialize PDFium: {0}")]
    InitError(String),

    #[error("Failed to load PDF: {0}")]
    LoadError(String),

    #[error("Invalid page number: {0}")]
    InvalidPage(u32),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Image encoding failed: {0}")]
    ImageError(String),
}

/// Page metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// Page number (1-based)
    pub number: u32,
    /// Page width in PDF points
    pub width: f32,
    /// Page height in PDF points
    pub height: f32,
}

/// Document metadata.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Total number of pages
    pub page_count: u32,
    /// Size of every page, in page order
    pub pages: Vec<PageInfo>,
    /// Document title (if available)
    pub title: Option<String>,
    /// Document author (if available)
    pub author: Option<String>,
    /// PDF version string
    pub pdf_version: String,
}

/// Library locations tried in order, most specific first.
fn library_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            #[cfg(target_os = "macos")]
            candidates.push(exe_dir.join("..").join("Frameworks").join("libpdfium.dylib"));
            candidates.push(exe_dir.join(Pdfium::pdfium_platform_library_name()));
        }
    }

    #[cfg(target_os = "macos")]
    candidates.push(PathBuf::from("/usr/local/lib/libpdfium.dylib"));
    #[cfg(target_os = "linux")]
    candidates.push(PathBuf::from("/usr/local/lib/libpdfium.so"));

    candidates
}

/// Bind to the PDFium library and return a usable Pdfium instance.
fn bind_pdfium() -> Result<Pdfium, PdfError> {
    static LOGGED_SUCCESS: AtomicBool = AtomicBool::new(false);

    for candidate in library_candidates() {
        let path = candidate.canonicalize().unwrap_or(candidate);
        if !path.exists() {
            continue;
        }
        match Pdfium::bind_to_library(&path) {
            Ok(bindings) => {
                if !LOGGED_SUCCESS.swap(true, Ordering::Relaxed) {
                    info!("[Kiosk PDF] Loaded library: {:?}", path);
                }
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => warn!("[Kiosk PDF] Failed library {:?}: {:?}", path, e),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            if !LOGGED_SUCCESS.swap(true, Ordering::Relaxed) {
                info!("[Kiosk PDF] Loaded system library");
            }
            Ok(Pdfium::new(bindings))
        }
        Err(e) => Err(PdfError::InitError(format!(
            "Could not load PDFium library ({:?}). Place libpdfium next to the executable or install it system-wide.",
            e
        ))),
    }
}

/// Convert a 1-based page number to PDFium's page index.
fn page_index(page: u32) -> Result<u16, PdfError> {
    page.checked_sub(1)
        .and_then(|index| u16::try_from(index).ok())
        .ok_or(PdfError::InvalidPage(page))
}

/// Load a PDF from bytes and return document info.
pub fn load_pdf_from_bytes(bytes: &[u8]) -> Result<DocumentInfo, PdfError> {
    let pdfium = bind_pdfium()?;
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PdfError::LoadError(e.to_string()))?;

    let metadata = doc.metadata();
    let title = metadata
        .get(PdfDocumentMetadataTagType::Title)
        .map(|t| t.value().to_string());
    let author = metadata
        .get(PdfDocumentMetadataTagType::Author)
        .map(|t| t.value().to_string());

    let pages = doc
        .pages()
        .iter()
        .zip(1u32..)
        .map(|(page, number)| PageInfo {
            number,
            width: page.width().value,
            height: page.height().value,
        })
        .collect::<Vec<_>>();

    Ok(DocumentInfo {
        page_count: pages.len() as u32,
        pages,
        title,
        author,
        pdf_version: format!("{:?}", doc.version()),
    })
}

/// Render a page into an RGBA bitmap of exactly `width × height` pixels.
pub fn render_page_to_image(
    bytes: &[u8],
    page: u32,
    width: u32,
    height: u32,
) -> Result<image::RgbaImage, PdfError> {
    let pdfium = bind_pdfium()?;
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PdfError::LoadError(e.to_string()))?;

    let pdf_page = doc
        .pages()
        .get(page_index(page)?)
        .map_err(|_| PdfError::InvalidPage(page))?;

    let to_px = |value: u32| {
        i32::try_from(value)
            .map_err(|_| PdfError::RenderError(format!("surface too large: {}", value)))
    };
    let config = PdfRenderConfig::new()
        .set_target_width(to_px(width)?)
        .set_target_height(to_px(height)?)
        .render_form_data(true)
        .render_annotations(true);

    let bitmap = pdf_page
        .render_with_config(&config)
        .map_err(|e| PdfError::RenderError(e.to_string()))?;

    Ok(bitmap.as_image().into_rgba8())
}

/// Pixel size PDFium should produce for a viewport under a density transform.
pub fn paint_target_size(viewport: Viewport, transform: Option<PaintTransform>) -> (u32, u32) {
    let (sx, sy) = transform.map_or((1.0, 1.0), |t| (f64::from(t[0]), f64::from(t[3])));
    let width = (f64::from(viewport.width) * sx).floor().max(0.0) as u32;
    let height = (f64::from(viewport.height) * sy).floor().max(0.0) as u32;
    (width, height)
}

async fn blocking<T, F>(work: F) -> Result<T, PdfError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PdfError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PdfError::RenderError(format!("PDFium task failed: {}", e)))?
}

/// Download a remote document.
fn fetch_remote(url: &url::Url) -> Result<Vec<u8>, PdfError> {
    let agent = ureq::agent();
    let resp = agent
        .get(url.as_str())
        .set("User-Agent", "kiosk-viewer")
        .call()
        .map_err(|e| PdfError::LoadError(format!("fetch failed: {}", e)))?;

    let mut bytes = Vec::new();
    resp.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| PdfError::LoadError(format!("{}: {}", url, e)))?;
    Ok(bytes)
}

/// Page info by 1-based number.
fn page_info(info: &DocumentInfo, page: u32) -> Result<PageInfo, PdfError> {
    page.checked_sub(1)
        .and_then(|index| info.pages.get(index as usize))
        .copied()
        .ok_or(PdfError::InvalidPage(page))
}

/// Opens local or remote documents through PDFium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumSource;

impl PdfiumSource {
    pub fn new() -> Self {
        Self
    }
}

/// A PDF held in memory.
#[derive(Debug, Clone)]
pub struct PdfiumDocument {
    bytes: Arc<Vec<u8>>,
    info: DocumentInfo,
}

/// A page of a [`PdfiumDocument`].
#[derive(Debug, Clone)]
pub struct PdfiumPage {
    bytes: Arc<Vec<u8>>,
    info: PageInfo,
}

impl DocumentSource for PdfiumSource {
    type Document = PdfiumDocument;

    async fn open(&self, locator: &Locator) -> Result<PdfiumDocument, PdfError> {
        let bytes = match locator {
            Locator::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|e| PdfError::LoadError(format!("{}: {}", path.display(), e)))?,
            Locator::Remote(url) => {
                let url = url.clone();
                blocking(move || fetch_remote(&url)).await?
            }
        };
        let bytes = Arc::new(bytes);

        let shared = Arc::clone(&bytes);
        let info = blocking(move || load_pdf_from_bytes(&shared)).await?;
        debug!(
            "[Kiosk PDF] Opened {} ({} pages, {}, title {:?}, author {:?})",
            locator,
            info.page_count,
            info.pdf_version,
            info.title,
            info.author
        );

        Ok(PdfiumDocument { bytes, info })
    }
}

impl DocumentHandle for PdfiumDocument {
    type Page = PdfiumPage;

    fn page_count(&self) -> u32 {
        self.info.page_count
    }

    async fn get_page(&self, page: u32) -> Result<PdfiumPage, PdfError> {
        let info = page_info(&self.info, page)?;
        Ok(PdfiumPage {
            bytes: Arc::clone(&self.bytes),
            info,
        })
    }
}

impl PageSource for PdfiumPage {
    /// PDF points map 1:1 onto CSS pixels at scale 1.0.
    fn viewport(&self, scale: f32) -> Viewport {
        Viewport {
            width: self.info.width * scale,
            height: self.info.height * scale,
        }
    }

    async fn paint(
        &self,
        surface: &mut Surface,
        viewport: Viewport,
        transform: Option<PaintTransform>,
    ) -> Result<(), PdfError> {
        let (width, height) = paint_target_size(viewport, transform);
        if width == 0 || height == 0 {
            return Err(PdfError::RenderError(format!(
                "empty render target {}x{}",
                width, height
            )));
        }

        let bytes = Arc::clone(&self.bytes);
        let page = self.info.number;
        let bitmap = blocking(move || render_page_to_image(&bytes, page, width, height)).await?;
        surface.blit(&bitmap);
        Ok(())
    }
}
