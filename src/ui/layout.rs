//! Pane layout
//!
//! [`compute`] is a pure function from the terminal area and a
//! [`LayoutConfig`] to the five pane rectangles. The panes tile the terminal
//! exactly: main row (source + sidebar) on top, log strip below it, status
//! bar as the final row; the sidebar splits into variables above and
//! breakpoints below. `LayoutConfig` is only ever mutated through its resize
//! methods, which the `<`/`>` key handler calls.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Narrowest the sidebar may get.
pub const SIDEBAR_MIN: u16 = 20;
/// Narrowest the source pane may get; bounds the sidebar from the other side.
pub const SOURCE_MIN: u16 = 20;
/// Sidebar growth/shrink step per keypress.
const SIDEBAR_STEP: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    pub sidebar_width: u16,
    pub log_height: u16,
    pub breakpoints_height: u16,
    pub status_height: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            sidebar_width: 40,
            log_height: 10,
            breakpoints_height: 10,
            status_height: 1,
        }
    }
}

impl LayoutConfig {
    /// Widen the sidebar by one step, within bounds for `terminal_width`.
    pub fn grow_sidebar(&mut self, terminal_width: u16) {
        self.sidebar_width = clamp_sidebar(
            self.sidebar_width.saturating_add(SIDEBAR_STEP),
            terminal_width,
        );
    }

    /// Narrow the sidebar by one step, within bounds for `terminal_width`.
    pub fn shrink_sidebar(&mut self, terminal_width: u16) {
        self.sidebar_width = clamp_sidebar(
            self.sidebar_width.saturating_sub(SIDEBAR_STEP),
            terminal_width,
        );
    }
}

fn clamp_sidebar(width: u16, terminal_width: u16) -> u16 {
    let upper = terminal_width.saturating_sub(SOURCE_MIN).max(SIDEBAR_MIN);
    width.clamp(SIDEBAR_MIN, upper)
}

/// The five pane rectangles for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub source: Rect,
    pub variables: Rect,
    pub breakpoints: Rect,
    pub log: Rect,
    pub status: Rect,
}

/// Split `area` into the pane rectangles.
pub fn compute(area: Rect, config: &LayoutConfig) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(config.log_height),
            Constraint::Length(config.status_height),
        ])
        .split(area);

    let sidebar_width = clamp_sidebar(config.sidebar_width, area.width);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(sidebar_width)])
        .split(rows[0]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(config.breakpoints_height),
        ])
        .split(columns[1]);

    AppLayout {
        source: columns[0],
        variables: sidebar[0],
        breakpoints: sidebar[1],
        log: rows[1],
        status: rows[2],
    }
}
