//! Source pane rendering
//!
//! Displays the file the selected frame points at, with line numbers and a
//! highlighted band on the executing line. When the file cannot be read the
//! pane degrades to a disassembly view around the program counter; when
//! there is no frame at all it says so instead of going blank.

use crate::backend::{FrameView, Instruction};
use crate::ui::scroll::clamp_offset;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{pane_block, render_scrollbar};

/// Render the source pane.
///
/// `lines` is `None` when the frame's file could not be read; `disassembly`
/// carries the fallback instructions for that case (possibly empty).
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    frame_view: Option<&FrameView>,
    lines: Option<&[String]>,
    disassembly: &[Instruction],
    scroll_offset: &mut usize,
) {
    let block = pane_block("Source");

    let Some(view) = frame_view else {
        let message = Paragraph::new("No frame selected.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.error));
        frame.render_widget(message, area);
        return;
    };

    let Some(location) = &view.source else {
        let message = Paragraph::new("No line entry info.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.error));
        frame.render_widget(message, area);
        return;
    };

    let content_height = area.height.saturating_sub(2).max(1) as usize;
    let content_width = area.width.saturating_sub(2) as usize;

    let Some(lines) = lines else {
        render_disassembly(
            frame, area, block, view, location, disassembly, content_height,
        );
        return;
    };

    *scroll_offset = clamp_offset(*scroll_offset, lines.len(), content_height);

    let current_line = location.line;
    let visible: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(content_height)
        .map(|(idx, text)| {
            let line_number = idx + 1;
            let is_current = line_number == current_line;
            render_source_line(text, line_number, is_current, content_width)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
    render_scrollbar(frame, area, lines.len(), content_height, *scroll_offset);
}

fn render_source_line(
    text: &str,
    line_number: usize,
    is_current: bool,
    content_width: usize,
) -> Line<'static> {
    let (number_style, text_style) = if is_current {
        let band = Style::default()
            .bg(DEFAULT_THEME.current_line_bg)
            .fg(DEFAULT_THEME.current_line_fg);
        (band.add_modifier(Modifier::BOLD), band)
    } else {
        (
            Style::default().fg(DEFAULT_THEME.line_number),
            Style::default().fg(DEFAULT_THEME.fg),
        )
    };

    let number = format!("{:4} ", line_number);
    let mut body: String = expand_tabs(text);
    let body_width = content_width.saturating_sub(number.len());
    if body.chars().count() > body_width {
        body = body.chars().take(body_width).collect();
    }
    if is_current {
        // Paint the band across the whole row, not just the text.
        let used = body.chars().count();
        body.extend(std::iter::repeat(' ').take(body_width.saturating_sub(used)));
    }

    Line::from(vec![
        Span::styled(number, number_style),
        Span::styled(body, text_style),
    ])
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', "    ")
}

#[allow(clippy::too_many_arguments)]
fn render_disassembly(
    frame: &mut Frame,
    area: Rect,
    block: ratatui::widgets::Block<'_>,
    view: &FrameView,
    location: &crate::backend::SourceLocation,
    disassembly: &[Instruction],
    content_height: usize,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Could not open source: {}", location.file.display()),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!("Function: {}", view.function),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
        Line::from(Span::styled(
            format!("At address: {:#x}", view.pc),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press 'n' (Step Over) or 'o' (Step Out) to return to your code.",
            Style::default().fg(DEFAULT_THEME.secondary),
        )),
        Line::default(),
    ];

    for insn in disassembly.iter().take(content_height.saturating_sub(lines.len())) {
        let style = if insn.address == view.pc {
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.current_line_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.fg)
        };
        lines.push(Line::from(Span::styled(
            format!("{:#014x}: {}", insn.address, insn.text),
            style,
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
