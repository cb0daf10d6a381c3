//! Viewer commands for page navigation and zoom.
//!
//! These map the four UI actions onto scheduler state. Every action is a
//! no-op at its bound; nothing wraps around.

use crate::scheduler::{RenderScheduler, RenderTicket, SchedulerError, Zoom};
use log::debug;
use std::str::FromStr;

/// User-triggered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    PreviousPage,
    NextPage,
    ZoomIn,
    ZoomOut,
    /// End the session once the render in flight finishes
    Close,
}

impl FromStr for ViewerCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "prev" | "previous" => Ok(Self::PreviousPage),
            "n" | "next" => Ok(Self::NextPage),
            "+" | "in" | "zoom-in" => Ok(Self::ZoomIn),
            "-" | "out" | "zoom-out" => Ok(Self::ZoomOut),
            "q" | "quit" | "close" => Ok(Self::Close),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

/// Inclusive zoom bounds and step, all in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: Zoom,
    pub max: Zoom,
    pub step: u16,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: Zoom::from_percent(40),
            max: Zoom::from_percent(300),
            step: 10,
        }
    }
}

impl ZoomRange {
    /// One step up, landing on `max` rather than past it.
    pub fn step_in(&self, zoom: Zoom) -> Option<Zoom> {
        if zoom >= self.max {
            return None;
        }
        let next = zoom.percent().saturating_add(self.step);
        Some(Zoom::from_percent(next.min(self.max.percent())))
    }

    /// One step down, landing on `min` rather than past it.
    pub fn step_out(&self, zoom: Zoom) -> Option<Zoom> {
        if zoom <= self.min {
            return None;
        }
        let next = zoom.percent().saturating_sub(self.step);
        Some(Zoom::from_percent(next.max(self.min.percent())))
    }
}

/// What a command changed, so the caller can refresh the display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandEffect {
    /// Page number to show immediately; set whenever a render was requested
    pub page: Option<u32>,
    /// New zoom label in percent
    pub zoom_percent: Option<u32>,
    /// Render to start now, if the scheduler was idle
    pub ticket: Option<RenderTicket>,
}

impl CommandEffect {
    pub fn is_noop(&self) -> bool {
        self.page.is_none() && self.zoom_percent.is_none()
    }
}

/// Apply a command to the scheduler.
pub fn dispatch(
    scheduler: &mut RenderScheduler,
    zoom_range: &ZoomRange,
    command: ViewerCommand,
) -> Result<CommandEffect, SchedulerError> {
    let state = scheduler.state();
    let current = state.current_page;
    let zoom = state.zoom;

    let effect = match command {
        ViewerCommand::PreviousPage if current > 1 => navigate(scheduler, current - 1)?,
        ViewerCommand::NextPage if current < scheduler.page_count() => {
            navigate(scheduler, current + 1)?
        }
        ViewerCommand::ZoomIn => match zoom_range.step_in(zoom) {
            Some(next) => rezoom(scheduler, next),
            None => CommandEffect::default(),
        },
        ViewerCommand::ZoomOut => match zoom_range.step_out(zoom) {
            Some(next) => rezoom(scheduler, next),
            None => CommandEffect::default(),
        },
        _ => CommandEffect::default(),
    };

    if effect.is_noop() {
        debug!("[Kiosk] {:?} ignored at bound", command);
    }
    Ok(effect)
}

fn navigate(scheduler: &mut RenderScheduler, page: u32) -> Result<CommandEffect, SchedulerError> {
    let ticket = scheduler.go_to_page(page)?;
    Ok(CommandEffect {
        page: Some(page),
        zoom_percent: None,
        ticket,
    })
}

fn rezoom(scheduler: &mut RenderScheduler, zoom: Zoom) -> CommandEffect {
    let ticket = scheduler.set_zoom(zoom);
    CommandEffect {
        page: Some(scheduler.state().current_page),
        zoom_percent: Some(u32::from(zoom.percent())),
        ticket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(pages: u32, percent: u16) -> RenderScheduler {
        RenderScheduler::new(pages, Zoom::from_percent(percent))
    }

    fn run(s: &mut RenderScheduler, command: ViewerCommand) -> CommandEffect {
        let effect = dispatch(s, &ZoomRange::default(), command).unwrap();
        // Finish any render immediately so the next command sees an idle scheduler
        while s.complete().is_some() {}
        effect
    }

    #[test]
    fn test_previous_at_first_page_is_noop() {
        let mut s = idle(3, 100);
        let effect = run(&mut s, ViewerCommand::PreviousPage);
        assert!(effect.is_noop());
        assert_eq!(effect.ticket, None);
        assert_eq!(s.state().current_page, 1);
    }

    #[test]
    fn test_next_stops_at_last_page() {
        let mut s = idle(3, 100);
        assert_eq!(run(&mut s, ViewerCommand::NextPage).page, Some(2));
        assert_eq!(run(&mut s, ViewerCommand::NextPage).page, Some(3));

        let effect = run(&mut s, ViewerCommand::NextPage);
        assert!(effect.is_noop());
        assert_eq!(s.state().current_page, 3);

        assert_eq!(run(&mut s, ViewerCommand::PreviousPage).page, Some(2));
    }

    #[test]
    fn test_navigation_while_idle_starts_render() {
        let mut s = idle(3, 100);
        let effect = dispatch(&mut s, &ZoomRange::default(), ViewerCommand::NextPage).unwrap();
        assert_eq!(effect.ticket.map(|t| t.page), Some(2));
        assert!(s.is_rendering());
    }

    #[test]
    fn test_zoom_in_ceiling_is_noop() {
        let mut s = idle(1, 290);
        let effect = run(&mut s, ViewerCommand::ZoomIn);
        assert_eq!(effect.zoom_percent, Some(300));

        let before = s.state().clone();
        let effect = run(&mut s, ViewerCommand::ZoomIn);
        assert!(effect.is_noop());
        assert_eq!(*s.state(), before);
    }

    #[test]
    fn test_zoom_out_floor_is_noop() {
        let mut s = idle(1, 50);
        assert_eq!(run(&mut s, ViewerCommand::ZoomOut).zoom_percent, Some(40));
        assert!(run(&mut s, ViewerCommand::ZoomOut).is_noop());
        assert_eq!(s.state().zoom.percent(), 40);
    }

    #[test]
    fn test_zoom_never_leaves_bounds() {
        let mut s = idle(1, 100);
        for _ in 0..40 {
            run(&mut s, ViewerCommand::ZoomIn);
            assert!(s.state().zoom.percent() <= 300);
        }
        assert_eq!(s.state().zoom.percent(), 300);
        for _ in 0..40 {
            run(&mut s, ViewerCommand::ZoomOut);
            assert!(s.state().zoom.percent() >= 40);
        }
        assert_eq!(s.state().zoom.percent(), 40);
    }

    #[test]
    fn test_step_overshoot_lands_on_bound() {
        let range = ZoomRange {
            min: Zoom::from_percent(40),
            max: Zoom::from_percent(300),
            step: 25,
        };
        assert_eq!(range.step_in(Zoom::from_percent(290)), Some(Zoom::from_percent(300)));
        assert_eq!(range.step_out(Zoom::from_percent(50)), Some(Zoom::from_percent(40)));
    }

    #[test]
    fn test_zoom_while_busy_parks_current_page() {
        let mut s = idle(5, 100);
        s.go_to_page(2).unwrap();

        let effect = dispatch(&mut s, &ZoomRange::default(), ViewerCommand::ZoomIn).unwrap();
        assert_eq!(effect.ticket, None);
        assert_eq!(effect.page, Some(2));
        assert_eq!(effect.zoom_percent, Some(110));
        assert_eq!(s.state().pending_page, Some(2));
    }

    #[test]
    fn test_close_changes_nothing() {
        let mut s = idle(2, 100);
        assert!(run(&mut s, ViewerCommand::Close).is_noop());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("n".parse::<ViewerCommand>(), Ok(ViewerCommand::NextPage));
        assert_eq!("Prev".parse::<ViewerCommand>(), Ok(ViewerCommand::PreviousPage));
        assert_eq!("+".parse::<ViewerCommand>(), Ok(ViewerCommand::ZoomIn));
        assert_eq!("out".parse::<ViewerCommand>(), Ok(ViewerCommand::ZoomOut));
        assert_eq!("q".parse::<ViewerCommand>(), Ok(ViewerCommand::Close));
        assert!("jump".parse::<ViewerCommand>().is_err());
    }
}
