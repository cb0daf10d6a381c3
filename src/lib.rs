// Kiosk Viewer - single-page PDF viewer core
//
// This crate provides a latest-wins page render scheduler, high-DPI surface
// geometry and a PDFium-backed document source behind a small async session.

pub mod commands;
pub mod config;
pub mod geometry;
pub mod pdf;
pub mod scheduler;
pub mod session;
pub mod surface;
pub mod ui;

pub use commands::{dispatch, CommandEffect, ViewerCommand, ZoomRange};
pub use config::{ConfigError, Labels, ViewerConfig, ZoomConfig};
pub use geometry::{PaintTransform, RenderGeometry};
pub use pdf::{
    DocumentHandle, DocumentSource, Locator, PageSource, PdfError, PdfiumSource, Viewport,
};
pub use scheduler::{RenderScheduler, RenderTicket, SchedulerError, ViewerState, Zoom};
pub use session::{run_session, SessionError, SessionSummary, OPEN_FAILED_MESSAGE};
pub use surface::Surface;
pub use ui::ViewerUi;
