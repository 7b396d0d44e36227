//! Log pane rendering
//!
//! Normally shows the newest log entries anchored to the bottom of the pane;
//! the scroll offset counts backward in time from there. While an input mode
//! is active the pane turns into the prompt line instead, with a block
//! cursor after the typed text.

use crate::logbuf::LogBuffer;
use crate::ui::app::AppMode;
use crate::ui::scroll::{clamp_offset, max_offset};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{pane_block, render_scrollbar};

pub fn render_log_pane(
    frame: &mut Frame,
    area: Rect,
    log: &LogBuffer,
    mode: &AppMode,
    input: &str,
    scroll_offset: &mut usize,
) {
    let content_width = area.width.saturating_sub(2) as usize;

    match mode {
        AppMode::EnterBreakpoint | AppMode::EnterVariable => {
            let block = pane_block("Input (Esc to Cancel)");
            let label = match mode {
                AppMode::EnterBreakpoint => "Add Breakpoint: ",
                _ => "Print Expression: ",
            };
            let mut prompt = format!("{}{}", label, input);
            // Keep the tail visible when the input outgrows the pane.
            let overflow = (prompt.chars().count() + 1).saturating_sub(content_width);
            if overflow > 0 {
                prompt = prompt.chars().skip(overflow).collect();
            }
            let line = Line::from(vec![
                Span::styled(
                    prompt,
                    Style::default()
                        .fg(DEFAULT_THEME.fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "_",
                    Style::default()
                        .fg(DEFAULT_THEME.fg)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                ),
            ]);
            frame.render_widget(Paragraph::new(line).block(block), area);
        }
        AppMode::Normal => {
            let block = pane_block("Command & Log");
            let visible_height = area.height.saturating_sub(2).max(1) as usize;
            let total = log.len();
            *scroll_offset = clamp_offset(*scroll_offset, total, visible_height);

            // Offset counts from the bottom: skip `offset` newest entries.
            let shown = total.saturating_sub(*scroll_offset);
            let first = shown.saturating_sub(visible_height);
            let lines: Vec<Line> = log.entries()[first..shown]
                .iter()
                .map(|entry| {
                    let mut text = entry.text.clone();
                    let budget = content_width.saturating_sub(entry.stamp.len() + 1);
                    if text.chars().count() > budget {
                        text = text.chars().take(budget).collect();
                    }
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", entry.stamp),
                            Style::default().fg(DEFAULT_THEME.comment),
                        ),
                        Span::styled(text, Style::default().fg(DEFAULT_THEME.fg)),
                    ])
                })
                .collect();

            frame.render_widget(Paragraph::new(lines).block(block), area);
            // Convert the bottom-up offset to the scrollbar's top-down one.
            let top_down = max_offset(total, visible_height).saturating_sub(*scroll_offset);
            render_scrollbar(frame, area, total, visible_height, top_down);
        }
    }
}
