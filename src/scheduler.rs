//! Page render scheduler.
//!
//! Serializes renders against the single drawing surface. At most one render
//! is in flight; requests arriving while busy overwrite a single pending slot
//! so only the latest survives.
//!
//! ```text
//! Idle      --request-->                Rendering (ticket issued)
//! Rendering --request-->                Rendering (pending overwritten)
//! Rendering --complete, pending-->      Rendering (ticket for pending)
//! Rendering --complete, no pending-->   Idle
//! ```

use log::debug;
use thiserror::Error;

/// Errors returned by scheduler operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Page {page} is outside 1..={page_count}")]
    PageOutOfRange { page: u32, page_count: u32 },
}

/// Zoom level stored as a whole percentage so stepping stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Zoom(u16);

impl Zoom {
    pub const fn from_percent(percent: u16) -> Self {
        Self(percent)
    }

    /// Nearest whole percent to a scale factor.
    pub fn from_scale(scale: f32) -> Self {
        let percent = (f64::from(scale) * 100.0).round();
        Self(percent.clamp(0.0, f64::from(u16::MAX)) as u16)
    }

    pub fn percent(self) -> u16 {
        self.0
    }

    pub fn scale(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

/// Everything the viewer knows about what should be on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub current_page: u32,
    pub zoom: Zoom,
    pub render_in_flight: bool,
    pub pending_page: Option<u32>,
}

/// A render to start now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTicket {
    pub page: u32,
    /// Zoom scale captured when the render began
    pub scale: f32,
}

/// Owns [`ViewerState`] for one loaded document.
#[derive(Debug)]
pub struct RenderScheduler {
    state: ViewerState,
    page_count: u32,
}

impl RenderScheduler {
    /// Create an idle scheduler showing page 1.
    pub fn new(page_count: u32, zoom: Zoom) -> Self {
        Self {
            state: ViewerState {
                current_page: 1,
                zoom,
                render_in_flight: false,
                pending_page: None,
            },
            page_count,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_rendering(&self) -> bool {
        self.state.render_in_flight
    }

    /// Ask for `page` to be visible at the current zoom.
    ///
    /// Returns a ticket when the render should start immediately, `None`
    /// when it was parked as pending behind the render in flight.
    pub fn request_render(&mut self, page: u32) -> Result<Option<RenderTicket>, SchedulerError> {
        if page == 0 || page > self.page_count {
            return Err(SchedulerError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }

        if self.state.render_in_flight {
            if let Some(dropped) = self.state.pending_page.replace(page) {
                debug!("[Kiosk] Pending page {} superseded by {}", dropped, page);
            }
            return Ok(None);
        }

        Ok(Some(self.begin(page)))
    }

    /// Mark the in-flight render finished. Drains at most one pending
    /// request, returning its ticket.
    pub fn complete(&mut self) -> Option<RenderTicket> {
        if !self.state.render_in_flight {
            return None;
        }
        self.state.render_in_flight = false;

        let page = self.state.pending_page.take()?;
        Some(self.begin(page))
    }

    /// Move to `page` and request its render.
    pub fn go_to_page(&mut self, page: u32) -> Result<Option<RenderTicket>, SchedulerError> {
        let ticket = self.request_render(page)?;
        self.state.current_page = page;
        Ok(ticket)
    }

    /// Change zoom and re-request the current page.
    pub fn set_zoom(&mut self, zoom: Zoom) -> Option<RenderTicket> {
        self.state.zoom = zoom;
        let page = self.state.current_page;
        // current_page is always within range
        self.request_render(page).ok().flatten()
    }

    fn begin(&mut self, page: u32) -> RenderTicket {
        self.state.render_in_flight = true;
        RenderTicket {
            page,
            scale: self.state.zoom.scale(),
        }
    }
}
