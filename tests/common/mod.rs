#![allow(dead_code)]

use kiosk_viewer::{
    DocumentHandle, DocumentSource, Labels, Locator, PageSource, PaintTransform, PdfError,
    Surface, ViewerConfig, ViewerUi, Viewport,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::Semaphore;

pub const PAGE_SIZE: (f32, f32) = (595.0, 842.0);

/// What a scripted document does.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub page_count: u32,
    pub fail_open: bool,
    pub fail_fetch: Vec<u32>,
    pub fail_paint: Vec<u32>,
}

impl Script {
    pub fn pages(page_count: u32) -> Self {
        Self {
            page_count,
            ..Self::default()
        }
    }
}

/// One call to `paint`, recorded when it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintCall {
    pub page: u32,
    pub scale: f32,
    pub viewport: Viewport,
    pub transform: Option<PaintTransform>,
    pub backing: (u32, u32),
}

struct Shared {
    script: Script,
    gate: Semaphore,
    paints: RefCell<Vec<PaintCall>>,
}

/// In-memory document source whose paints wait on a gate.
#[derive(Clone)]
pub struct ScriptedSource {
    shared: Rc<Shared>,
}

impl ScriptedSource {
    /// Paints complete as soon as they start.
    pub fn open_gate(script: Script) -> Self {
        Self::with_permits(script, 1 << 20)
    }

    /// Paints block until [`ScriptedSource::release`] is called.
    pub fn closed_gate(script: Script) -> Self {
        Self::with_permits(script, 0)
    }

    fn with_permits(script: Script, permits: usize) -> Self {
        Self {
            shared: Rc::new(Shared {
                script,
                gate: Semaphore::new(permits),
                paints: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn release(&self, paints: usize) {
        self.shared.gate.add_permits(paints);
    }

    pub fn paints(&self) -> Vec<PaintCall> {
        self.shared.paints.borrow().clone()
    }

    pub fn painted_pages(&self) -> Vec<u32> {
        self.paints().iter().map(|p| p.page).collect()
    }
}

pub struct ScriptedDocument {
    shared: Rc<Shared>,
}

pub struct ScriptedPage {
    shared: Rc<Shared>,
    number: u32,
    scale: Cell<f32>,
}

impl DocumentSource for ScriptedSource {
    type Document = ScriptedDocument;

    async fn open(&self, _locator: &Locator) -> Result<ScriptedDocument, PdfError> {
        tokio::task::yield_now().await;
        if self.shared.script.fail_open {
            return Err(PdfError::LoadError("scripted open failure".to_string()));
        }
        Ok(ScriptedDocument {
            shared: Rc::clone(&self.shared),
        })
    }
}

impl DocumentHandle for ScriptedDocument {
    type Page = ScriptedPage;

    fn page_count(&self) -> u32 {
        self.shared.script.page_count
    }

    async fn get_page(&self, page: u32) -> Result<ScriptedPage, PdfError> {
        tokio::task::yield_now().await;
        if self.shared.script.fail_fetch.contains(&page) {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(ScriptedPage {
            shared: Rc::clone(&self.shared),
            number: page,
            scale: Cell::new(1.0),
        })
    }
}

impl PageSource for ScriptedPage {
    fn viewport(&self, scale: f32) -> Viewport {
        self.scale.set(scale);
        Viewport {
            width: PAGE_SIZE.0 * scale,
            height: PAGE_SIZE.1 * scale,
        }
    }

    async fn paint(
        &self,
        surface: &mut Surface,
        viewport: Viewport,
        transform: Option<PaintTransform>,
    ) -> Result<(), PdfError> {
        self.shared.paints.borrow_mut().push(PaintCall {
            page: self.number,
            scale: self.scale.get(),
            viewport,
            transform,
            backing: surface.backing_size(),
        });

        self.shared
            .gate
            .acquire()
            .await
            .map_err(|e| PdfError::RenderError(e.to_string()))?
            .forget();

        if self.shared.script.fail_paint.contains(&self.number) {
            return Err(PdfError::RenderError(format!(
                "scripted paint failure on {}",
                self.number
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Labels(Labels),
    PageNumber(u32),
    PageCount(u32),
    Zoom(u32),
    Present {
        backing: (u32, u32),
        display: (u32, u32),
    },
    ShowContent,
    Error(String),
    PageError(u32, String),
}

/// Records every UI call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    events: Rc<RefCell<Vec<UiEvent>>>,
}

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.borrow().clone()
    }

    pub fn presented(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::Present { .. }))
    }

    pub fn page_errors(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::PageError(..)))
    }

    pub fn last_page_number(&self) -> Option<u32> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            UiEvent::PageNumber(page) => Some(*page),
            _ => None,
        })
    }

    pub fn zoom_labels(&self) -> Vec<u32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Zoom(percent) => Some(*percent),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(*e)).count()
    }

    fn push(&self, event: UiEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ViewerUi for RecordingUi {
    fn set_labels(&mut self, labels: &Labels) {
        self.push(UiEvent::Labels(labels.clone()));
    }

    fn set_page_number(&mut self, page: u32) {
        self.push(UiEvent::PageNumber(page));
    }

    fn set_page_count(&mut self, count: u32) {
        self.push(UiEvent::PageCount(count));
    }

    fn set_zoom_percent(&mut self, percent: u32) {
        self.push(UiEvent::Zoom(percent));
    }

    fn present(&mut self, surface: &Surface) {
        self.push(UiEvent::Present {
            backing: surface.backing_size(),
            display: surface.display_size(),
        });
    }

    fn show_content(&mut self) {
        self.push(UiEvent::ShowContent);
    }

    fn show_error(&mut self, message: &str) {
        self.push(UiEvent::Error(message.to_string()));
    }

    fn show_page_error(&mut self, page: u32, message: &str) {
        self.push(UiEvent::PageError(page, message.to_string()));
    }
}

pub fn config() -> ViewerConfig {
    ViewerConfig {
        locator: "scripted.pdf".to_string(),
        ..ViewerConfig::default()
    }
}

/// Give the session future a chance to run.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Yield until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
