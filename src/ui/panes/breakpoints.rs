//! Breakpoints pane rendering

use crate::backend::BreakpointView;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::pane_block;

pub fn render_breakpoints_pane(frame: &mut Frame, area: Rect, breakpoints: &[BreakpointView]) {
    let block = pane_block("Breakpoints");

    if breakpoints.is_empty() {
        let message = Paragraph::new("(none)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(message, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let items: Vec<ListItem> = breakpoints
        .iter()
        .take(visible_height)
        .map(|bp| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}: ", bp.id),
                    Style::default().fg(DEFAULT_THEME.primary),
                ),
                Span::styled(bp.label.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
