//! Scroll state for the three scrollable panes
//!
//! One offset per pane, all kept inside `0 ..= max(0, total − visible)`.
//! Source and variables offsets count from the top; the log offset counts
//! from the bottom (0 = newest entries visible), so scrolling back in time
//! increases it.
//!
//! The source pane auto-follows execution: when the program counter changes,
//! the offset is recomputed so the current line sits at roughly the vertical
//! center of the pane, clamped so the window never runs past end-of-file.
//! Manual source scrolling survives until the next stop because the pc is
//! remembered between iterations.

#[derive(Debug, Default)]
pub struct ScrollController {
    pub source: usize,
    pub variables: usize,
    /// Measured from the bottom of the log.
    pub log: usize,
    last_pc: Option<u64>,
}

/// Largest valid offset for a pane.
pub fn max_offset(total: usize, visible: usize) -> usize {
    total.saturating_sub(visible)
}

/// Clamp an offset into the valid range.
pub fn clamp_offset(offset: usize, total: usize, visible: usize) -> usize {
    offset.min(max_offset(total, visible))
}

/// Offset that centers `current_line` (1-based) in a pane `height` rows
/// tall, clamped so the window stays inside the file.
pub fn center_on_line(current_line: usize, total_lines: usize, height: usize) -> usize {
    let centered = current_line.saturating_sub(height / 2);
    centered.min(max_offset(total_lines, height))
}

impl ScrollController {
    pub fn new() -> Self {
        ScrollController::default()
    }

    /// Re-center the source pane if execution moved since the last call.
    pub fn auto_follow(
        &mut self,
        pc: u64,
        current_line: usize,
        total_lines: usize,
        height: usize,
    ) {
        if self.last_pc == Some(pc) {
            return;
        }
        self.last_pc = Some(pc);
        self.source = center_on_line(current_line, total_lines, height);
    }

    pub fn scroll_source(&mut self, delta: isize, total: usize, visible: usize) {
        self.source = step(self.source, delta, total, visible);
    }

    pub fn scroll_variables(&mut self, delta: isize, total: usize, visible: usize) {
        self.variables = step(self.variables, delta, total, visible);
    }

    /// Positive `delta` scrolls backward in time (offset grows from the
    /// bottom).
    pub fn scroll_log(&mut self, delta: isize, total: usize, visible: usize) {
        self.log = step(self.log, delta, total, visible);
    }
}

fn step(offset: usize, delta: isize, total: usize, visible: usize) -> usize {
    let moved = if delta.is_negative() {
        offset.saturating_sub(delta.unsigned_abs())
    } else {
        offset.saturating_add(delta as usize)
    };
    clamp_offset(moved, total, visible)
}
