//! Variables pane rendering
//!
//! Shows the flattened variable tree for the selected frame. The
//! `(type-char) ` prefix of every row gets its own highlight so the type
//! tags line up as a scannable column.

use crate::ui::flatten::VariableLine;
use crate::ui::scroll::clamp_offset;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::{pane_block, render_scrollbar};

pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[VariableLine],
    have_frame: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block("Locals");

    if !have_frame {
        let message = Paragraph::new("No frame selected.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.error));
        frame.render_widget(message, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = clamp_offset(*scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| ListItem::new(styled_row(line)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
    render_scrollbar(frame, area, lines.len(), visible_height, *scroll_offset);
}

/// Split one flattened row into indent, tag, and body spans.
fn styled_row(line: &VariableLine) -> Line<'static> {
    let text = &line.text;
    match (
        text.get(..line.tag.start),
        text.get(line.tag.clone()),
        text.get(line.tag.end..),
    ) {
        (Some(indent), Some(tag), Some(body)) => Line::from(vec![
            Span::raw(indent.to_string()),
            Span::styled(
                tag.to_string(),
                Style::default().fg(DEFAULT_THEME.type_tag),
            ),
            Span::styled(body.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
        ]),
        // Tag ranges can outlive heavy truncation; show the row unstyled.
        _ => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
    }
}
