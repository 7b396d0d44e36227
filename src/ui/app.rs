//! Application state and event loop
//!
//! [`App`] owns every piece of mutable UI state: the input-mode state
//! machine, the text buffer, the log, the scroll offsets, the layout
//! configuration, and the single cached source file. One iteration of
//! [`App::run`] snapshots the backend, re-centers the source pane if
//! execution moved, renders all panes, then blocks for the next key or
//! mouse event. Backend calls are synchronous, so the loop never observes a
//! command in flight.

use crate::backend::{
    BreakpointRequest, DebugBackend, Instruction, LaunchSpec, RunState,
};
use crate::cache::SourceCache;
use crate::logbuf::LogBuffer;
use crate::ui::flatten;
use crate::ui::layout::{self, AppLayout, LayoutConfig};
use crate::ui::panes;
use crate::ui::scroll::ScrollController;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    backend::Backend,
    layout::{Position, Rect},
    Frame, Terminal,
};
use std::io;

/// Instructions fetched around the pc for the no-source fallback.
const DISASM_WINDOW: usize = 32;

/// Which keys mean what right now. Exactly one mode is active; text keys
/// are commands in `Normal` and buffer edits otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    EnterBreakpoint,
    EnterVariable,
}

/// Item counts captured at render time, so mouse-wheel clamping agrees with
/// what is actually on screen.
#[derive(Debug, Default, Clone, Copy)]
struct PaneTotals {
    source: usize,
    variables: usize,
    log: usize,
}

pub struct App<B: DebugBackend> {
    backend: B,
    launch: LaunchSpec,
    mode: AppMode,
    input: String,
    log: LogBuffer,
    cache: SourceCache,
    scroll: ScrollController,
    config: LayoutConfig,
    last_layout: Option<AppLayout>,
    last_width: u16,
    totals: PaneTotals,
    disasm: Vec<Instruction>,
    disasm_pc: Option<u64>,
    should_quit: bool,
}

impl<B: DebugBackend> App<B> {
    pub fn new(backend: B, launch: LaunchSpec) -> Self {
        let mut log = LogBuffer::new();
        log.push("Debugger started. Press 'b' to add breakpoint, 'r' to run.");
        App {
            backend,
            launch,
            mode: AppMode::Normal,
            input: String::new(),
            log,
            cache: SourceCache::new(),
            scroll: ScrollController::new(),
            config: LayoutConfig::default(),
            last_layout: None,
            last_width: 0,
            totals: PaneTotals::default(),
            disasm: Vec::new(),
            disasm_pc: None,
            should_quit: false,
        }
    }

    /// Drive the render / block-on-input cycle until the user quits.
    pub fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> io::Result<()> {
        loop {
            self.draw(terminal)?;

            if self.should_quit {
                break;
            }

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                // Resize is picked up by the next draw.
                _ => {}
            }
        }
        self.backend.kill();
        Ok(())
    }

    /// Render one frame: snapshot the backend, auto-follow, draw all panes.
    pub fn draw<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> io::Result<()> {
        terminal.draw(|f| self.render(f))?;
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn render(&mut self, frame: &mut Frame) {
        let layout = layout::compute(frame.area(), &self.config);
        self.last_layout = Some(layout);
        self.last_width = frame.area().width;

        let state = self.backend.run_state();
        let frame_view = self.backend.selected_frame().cloned();

        let mut source_total = 0;
        if let Some(view) = &frame_view {
            if let Some(location) = &view.source {
                source_total = self
                    .cache
                    .lines(&location.file)
                    .map(|lines| lines.len())
                    .unwrap_or(0);
                if source_total > 0 {
                    let height = content_height(layout.source);
                    self.scroll
                        .auto_follow(view.pc, location.line, source_total, height);
                } else if self.disasm_pc != Some(view.pc) {
                    // Unreadable file: fall back to instructions around pc.
                    self.disasm = self.backend.disassemble(view.pc, DISASM_WINDOW);
                    self.disasm_pc = Some(view.pc);
                }
            }
        }

        let variable_lines = if frame_view.is_some() {
            let roots = self.backend.variables();
            flatten::flatten(
                &roots,
                layout.variables.width.saturating_sub(2) as usize,
            )
        } else {
            Vec::new()
        };

        self.totals = PaneTotals {
            source: source_total,
            variables: variable_lines.len(),
            log: self.log.len(),
        };

        let source_lines = frame_view
            .as_ref()
            .and_then(|view| view.source.as_ref())
            .and_then(|location| self.cache.lines(&location.file));

        panes::render_source_pane(
            frame,
            layout.source,
            frame_view.as_ref(),
            source_lines,
            &self.disasm,
            &mut self.scroll.source,
        );
        panes::render_variables_pane(
            frame,
            layout.variables,
            &variable_lines,
            frame_view.is_some(),
            &mut self.scroll.variables,
        );
        panes::render_breakpoints_pane(frame, layout.breakpoints, self.backend.breakpoints());
        panes::render_log_pane(
            frame,
            layout.log,
            &self.log,
            &self.mode,
            &self.input,
            &mut self.scroll.log,
        );
        panes::render_status_bar(frame, layout.status, state, &self.mode);
    }

    /// Dispatch one key press through the mode state machine.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::EnterBreakpoint | AppMode::EnterVariable => self.handle_input_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => self.run_target(),
            KeyCode::Char('b') => {
                self.input = self.breakpoint_seed();
                self.mode = AppMode::EnterBreakpoint;
            }
            KeyCode::Char('p') => {
                self.input.clear();
                self.mode = AppMode::EnterVariable;
            }
            KeyCode::Char('<') => self.config.grow_sidebar(self.last_width),
            KeyCode::Char('>') => self.config.shrink_sidebar(self.last_width),
            KeyCode::Char(ch @ ('n' | 's' | 'o' | 'c')) => self.step(ch),
            _ => {}
        }
    }

    /// Execution-control keys act only on a stopped process; otherwise they
    /// are dropped without queueing.
    fn step(&mut self, key: char) {
        if self.backend.run_state() != RunState::Stopped {
            return;
        }
        let (name, result) = match key {
            'n' => ("Step Over", self.backend.step_over()),
            's' => ("Step Into", self.backend.step_into()),
            'o' => ("Step Out", self.backend.step_out()),
            _ => ("Continue", self.backend.resume()),
        };
        if let Err(e) = result {
            self.log.push(format!("{} failed: {}", name, e));
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input.clear();
                self.mode = AppMode::Normal;
            }
            KeyCode::Enter => self.confirm_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Enter in an input mode: dispatch the buffer, fall back to Normal.
    /// An empty buffer dispatches nothing.
    fn confirm_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        let mode = std::mem::replace(&mut self.mode, AppMode::Normal);
        if text.is_empty() {
            return;
        }
        match mode {
            AppMode::EnterBreakpoint => {
                let request = BreakpointRequest::parse(&text);
                match self.backend.add_breakpoint(&request) {
                    Ok(view) => {
                        tracing::debug!(id = view.id, spec = %text, "breakpoint added");
                        self.log.push(format!("Breakpoint added: {}", text));
                    }
                    Err(e) => {
                        self.log
                            .push(format!("Failed/Invalid breakpoint: {} ({})", text, e));
                    }
                }
            }
            AppMode::EnterVariable => {
                if self.backend.selected_frame().is_none() {
                    self.log.push(format!(
                        "Error: No stack frame available to evaluate '{}'",
                        text
                    ));
                } else {
                    match self.backend.evaluate(&text) {
                        Ok(node) => {
                            for line in flatten::flatten(&[node], usize::MAX) {
                                self.log.push(line.text);
                            }
                        }
                        Err(e) => {
                            self.log
                                .push(format!("Error evaluating '{}': {}", text, e));
                        }
                    }
                }
            }
            AppMode::Normal => {}
        }
        // Snap the log to its newest entries so the outcome is visible.
        self.scroll.log = 0;
    }

    fn run_target(&mut self) {
        if self.backend.run_state() != RunState::NotStarted {
            self.log.push("Already running");
            return;
        }
        if self.backend.breakpoints().is_empty() {
            let request = BreakpointRequest::Symbol {
                name: "main".to_string(),
            };
            match self.backend.add_breakpoint(&request) {
                Ok(_) => self.log.push("No breakpoints. Added breakpoint at 'main'"),
                Err(e) => {
                    tracing::debug!(error = %e, "automatic main breakpoint failed");
                    self.log
                        .push("No breakpoints. Failed to add breakpoint at 'main'");
                }
            }
        }
        self.log.push("Launching...");
        let spec = self.launch.clone();
        match self.backend.launch(&spec) {
            Ok(()) => self.log.push("Launched"),
            Err(e) => self.log.push(format!("Launch failed: {}", e)),
        }
        self.scroll.log = 0;
    }

    /// Pre-seed the breakpoint prompt with `file:` for the current source.
    fn breakpoint_seed(&self) -> String {
        self.backend
            .selected_frame()
            .and_then(|view| view.source.as_ref())
            .and_then(|location| location.file.file_name())
            .map(|name| format!("{}:", name.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Route a wheel tick to the pane under the cursor.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let delta: isize = match mouse.kind {
            MouseEventKind::ScrollUp => -1,
            MouseEventKind::ScrollDown => 1,
            _ => return,
        };
        let Some(layout) = self.last_layout else {
            return;
        };
        let position = Position::new(mouse.column, mouse.row);
        if layout.source.contains(position) {
            self.scroll
                .scroll_source(delta, self.totals.source, content_height(layout.source));
        } else if layout.variables.contains(position) {
            self.scroll.scroll_variables(
                delta,
                self.totals.variables,
                content_height(layout.variables),
            );
        } else if layout.log.contains(position) {
            // The log offset grows from the bottom, so wheel-up means +1.
            self.scroll
                .scroll_log(-delta, self.totals.log, content_height(layout.log));
        }
    }
}

/// Rows inside a bordered pane.
fn content_height(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}
