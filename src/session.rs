//! Viewer session: the single-threaded driver around the render scheduler.
//!
//! One task owns the document, the surface, the scheduler and the UI. While
//! a render is in flight the loop keeps receiving commands; those only touch
//! the scheduler's pending slot, never the surface, which the render holds
//! exclusively until it finishes.

use crate::commands::{dispatch, CommandEffect, ViewerCommand, ZoomRange};
use crate::config::{ConfigError, ViewerConfig};
use crate::geometry::RenderGeometry;
use crate::pdf::{DocumentHandle, DocumentSource, Locator, PageSource, PdfError};
use crate::scheduler::{RenderScheduler, RenderTicket, SchedulerError};
use crate::surface::Surface;
use crate::ui::ViewerUi;
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::mpsc;

/// Shown in place of the loading indicator when the document cannot be opened.
pub const OPEN_FAILED_MESSAGE: &str =
    "Error: PDF file not found. Please check file name and location.";

/// Errors that end a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open document: {0}")]
    Open(#[source] PdfError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub page_count: u32,
    pub renders_completed: u32,
    pub renders_failed: u32,
    pub current_page: u32,
    pub zoom_percent: u32,
}

/// Fetch, size and paint one page. The surface is borrowed for the whole
/// render, so nothing else can draw until it resolves.
async fn render_ticket<D: DocumentHandle>(
    doc: &D,
    ticket: RenderTicket,
    density: f32,
    surface: &mut Surface,
) -> Result<RenderGeometry, PdfError> {
    let page = doc.get_page(ticket.page).await?;
    let viewport = page.viewport(ticket.scale);
    let geometry = RenderGeometry::compute(viewport, density);
    surface.resize(&geometry);
    page.paint(surface, viewport, geometry.transform).await?;
    Ok(geometry)
}

fn apply_effect<U: ViewerUi>(ui: &mut U, effect: &CommandEffect) {
    if let Some(percent) = effect.zoom_percent {
        ui.set_zoom_percent(percent);
    }
    if let Some(page) = effect.page {
        ui.set_page_number(page);
    }
}

/// Handle one command that arrived mid-render or while idle.
fn handle_command<U: ViewerUi>(
    scheduler: &mut RenderScheduler,
    zoom_range: &ZoomRange,
    ui: &mut U,
    command: ViewerCommand,
) -> Option<RenderTicket> {
    match dispatch(scheduler, zoom_range, command) {
        Ok(effect) => {
            apply_effect(ui, &effect);
            effect.ticket
        }
        Err(e) => {
            warn!("[Kiosk] {:?} rejected: {}", command, e);
            None
        }
    }
}

/// Open the configured document and run the viewer until `commands` yields
/// [`ViewerCommand::Close`] or every sender is dropped.
pub async fn run_session<S, U>(
    source: &S,
    ui: &mut U,
    config: &ViewerConfig,
    mut commands: mpsc::Receiver<ViewerCommand>,
) -> Result<SessionSummary, SessionError>
where
    S: DocumentSource,
    U: ViewerUi,
{
    config.validate()?;
    let labels = config.page_labels()?;
    let zoom_range = config.zoom_range()?;
    let initial_zoom = config.initial_zoom()?;
    let density = config.density();

    ui.set_labels(&labels);

    let opened = match Locator::parse(&config.locator) {
        Ok(locator) => source.open(&locator).await,
        Err(e) => Err(e),
    };
    let doc = match opened {
        Ok(doc) if doc.page_count() == 0 => {
            Err(PdfError::LoadError("document has no pages".to_string()))
        }
        other => other,
    };
    let doc = match doc {
        Ok(doc) => doc,
        Err(e) => {
            error!("[Kiosk] Failed to open {}: {}", config.locator, e);
            ui.show_error(OPEN_FAILED_MESSAGE);
            return Err(SessionError::Open(e));
        }
    };

    let page_count = doc.page_count();
    info!("[Kiosk] Opened {} ({} pages)", config.locator, page_count);

    let mut scheduler = RenderScheduler::new(page_count, initial_zoom);
    ui.set_page_count(page_count);
    ui.set_zoom_percent(u32::from(initial_zoom.percent()));

    let mut next = scheduler.request_render(1)?;
    ui.set_page_number(1);
    ui.show_content();

    let mut surface = Surface::new();
    let mut summary = SessionSummary {
        page_count,
        ..SessionSummary::default()
    };
    let mut closing = false;

    while !closing {
        let Some(ticket) = next.take() else {
            // Idle: nothing to draw until the next command
            match commands.recv().await {
                Some(ViewerCommand::Close) | None => break,
                Some(command) => {
                    next = handle_command(&mut scheduler, &zoom_range, ui, command);
                }
            }
            continue;
        };

        debug!("[Kiosk] Rendering page {} at {:.2}x", ticket.page, ticket.scale);
        ui.set_page_number(ticket.page);

        let outcome = {
            let render = render_ticket(&doc, ticket, density, &mut surface);
            tokio::pin!(render);
            loop {
                tokio::select! {
                    biased;
                    command = commands.recv(), if !closing => match command {
                        Some(ViewerCommand::Close) | None => closing = true,
                        Some(command) => {
                            let started = handle_command(&mut scheduler, &zoom_range, ui, command);
                            debug_assert!(started.is_none(), "render started while busy");
                        }
                    },
                    outcome = &mut render => break outcome,
                }
            }
        };

        match outcome {
            Ok(geometry) => {
                summary.renders_completed += 1;
                debug!(
                    "[Kiosk] Page {} done: backing {}x{}, layout {}x{}",
                    ticket.page,
                    geometry.backing_width,
                    geometry.backing_height,
                    geometry.display_width,
                    geometry.display_height
                );
                ui.present(&surface);
            }
            Err(e) => {
                summary.renders_failed += 1;
                warn!("[Kiosk] Page {} failed to render: {}", ticket.page, e);
                ui.show_page_error(ticket.page, &e.to_string());
            }
        }

        next = scheduler.complete();
        if let Some(pending) = next {
            debug!("[Kiosk] Draining pending page {}", pending.page);
        }
    }

    let state = scheduler.state();
    summary.current_page = state.current_page;
    summary.zoom_percent = u32::from(state.zoom.percent());
    info!(
        "[Kiosk] Session closed after {} renders ({} failed)",
        summary.renders_completed + summary.renders_failed,
        summary.renders_failed
    );
    Ok(summary)
}
