//! Status bar rendering

use crate::backend::RunState;
use crate::ui::app::AppMode;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(frame: &mut Frame, area: Rect, state: RunState, mode: &AppMode) {
    let base = Style::default()
        .bg(DEFAULT_THEME.status_bg)
        .fg(DEFAULT_THEME.status_fg);

    let hints = match mode {
        AppMode::Normal => {
            " | r=Run, b=Add breakpoint, p=Print, n=Step Over, s=Step Into, \
             o=Step Out, c=Continue, </>=Sidebar, q=Quit"
        }
        _ => " | Enter=Confirm, Esc=Cancel",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Status: {}", state),
            base.add_modifier(Modifier::BOLD),
        ),
        Span::styled(hints, base),
    ]);

    frame.render_widget(Paragraph::new(line).style(base), area);
}
