//! Pane rendering modules
//!
//! Each pane is a stateless `render_*` function drawing one rectangle from
//! the data it is handed plus a scroll offset. Scrollable panes clamp the
//! offset they are given back into range, so the invariant
//! `0 <= offset <= max(0, total - visible)` also survives terminal resizes.
//!
//! - [`source`]: source text with the executing line highlighted, falling
//!   back to disassembly when no source is available
//! - [`variables`]: flattened variable tree for the selected frame
//! - [`breakpoints`]: backend breakpoint list
//! - [`log`]: message log, doubling as the input prompt while typing
//! - [`status`]: status bar with run state and keybindings

pub mod breakpoints;
pub mod log;
pub mod source;
pub mod status;
pub mod variables;

pub use breakpoints::render_breakpoints_pane;
pub use log::render_log_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
pub use variables::render_variables_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Margin, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Standard pane frame: grey border, green title.
pub(crate) fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(
            Style::default()
                .fg(DEFAULT_THEME.title)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border))
}

/// Vertical scrollbar on the pane's right border. One convention
/// everywhere: `offset` counts from the top, thumb at the top means offset
/// zero. Panes that track from the bottom convert before calling.
pub(crate) fn render_scrollbar(
    frame: &mut Frame,
    area: Rect,
    total: usize,
    visible: usize,
    offset: usize,
) {
    if total <= visible || area.height <= 2 {
        return;
    }
    let mut state = ScrollbarState::new(total.saturating_sub(visible)).position(offset);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None)
        .style(Style::default().fg(DEFAULT_THEME.comment));
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut state,
    );
}
