//! Display outputs of the viewer.

use crate::config::Labels;
use crate::surface::Surface;

/// Where the viewer's state becomes visible.
///
/// Calls arrive on the session's thread in the order the viewer changes.
pub trait ViewerUi {
    /// Localized "Page" / "of" strings, applied once at startup.
    fn set_labels(&mut self, labels: &Labels);

    fn set_page_number(&mut self, page: u32);

    fn set_page_count(&mut self, count: u32);

    fn set_zoom_percent(&mut self, percent: u32);

    /// A render finished; the surface holds the new frame.
    fn present(&mut self, surface: &Surface);

    /// Replace the loading indicator with the content area.
    fn show_content(&mut self);

    /// Replace the loading indicator with a static error. The content area
    /// is never shown afterwards.
    fn show_error(&mut self, message: &str);

    /// A single page failed to render; the viewer stays usable.
    fn show_page_error(&mut self, page: u32, message: &str);
}
