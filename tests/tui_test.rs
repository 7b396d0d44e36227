// End-to-end tests: a scripted backend drives the full App, rendered into
// ratatui's TestBackend buffer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, Terminal};
use std::fs;
use std::path::PathBuf;
use tdbg::backend::{
    BackendError, BreakpointRequest, BreakpointView, DebugBackend, FrameView, Instruction,
    LaunchSpec, RunState, SourceLocation, TypeClass, TypeInfo, VariableNode,
};
use tdbg::ui::App;

/// Backend that stops at a fixed location when launched and reports a small
/// variable tree.
struct ScriptedBackend {
    state: RunState,
    stop_at: Option<FrameView>,
    breakpoints: Vec<BreakpointView>,
    variables: Vec<VariableNode>,
    disassembly: Vec<Instruction>,
}

impl ScriptedBackend {
    fn stopping_at(file: PathBuf, line: usize) -> Self {
        ScriptedBackend {
            state: RunState::NotStarted,
            stop_at: Some(FrameView {
                function: "main".to_string(),
                source: Some(SourceLocation { file, line }),
                pc: 0x4011_36,
            }),
            breakpoints: Vec::new(),
            variables: Vec::new(),
            disassembly: Vec::new(),
        }
    }
}

impl DebugBackend for ScriptedBackend {
    fn launch(&mut self, _spec: &LaunchSpec) -> Result<(), BackendError> {
        self.state = RunState::Stopped;
        Ok(())
    }

    fn run_state(&self) -> RunState {
        self.state
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn step_over(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn step_into(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn step_out(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn kill(&mut self) {
        self.state = RunState::Exited;
    }

    fn add_breakpoint(
        &mut self,
        req: &BreakpointRequest,
    ) -> Result<BreakpointView, BackendError> {
        let view = BreakpointView {
            id: self.breakpoints.len() as u32 + 1,
            label: req.to_string(),
        };
        self.breakpoints.push(view.clone());
        Ok(view)
    }

    fn breakpoints(&self) -> &[BreakpointView] {
        &self.breakpoints
    }

    fn selected_frame(&self) -> Option<&FrameView> {
        if self.state == RunState::Stopped {
            self.stop_at.as_ref()
        } else {
            None
        }
    }

    fn variables(&mut self) -> Vec<VariableNode> {
        self.variables.clone()
    }

    fn evaluate(&mut self, expr: &str) -> Result<VariableNode, BackendError> {
        Err(BackendError::Command(format!(
            "cannot evaluate '{}'",
            expr
        )))
    }

    fn disassemble(&mut self, _addr: u64, _count: usize) -> Vec<Instruction> {
        self.disassembly.clone()
    }
}

fn int_var(name: &str, value: &str) -> VariableNode {
    VariableNode {
        name: name.to_string(),
        ty: TypeInfo {
            name: "int".to_string(),
            class: TypeClass::Integer,
        },
        valid: true,
        value: Some(value.to_string()),
        children: Vec::new(),
    }
}

fn write_source(name: &str, lines: usize) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let text: String = (1..=lines).map(|n| format!("line {}\n", n)).collect();
    fs::write(&path, text).unwrap();
    path
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    let mut out = String::new();
    for (i, cell) in buffer.content.iter().enumerate() {
        out.push_str(cell.symbol());
        if (i + 1) % width == 0 {
            out.push('\n');
        }
    }
    out
}

fn press(app: &mut App<ScriptedBackend>, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn wheel(app: &mut App<ScriptedBackend>, kind: MouseEventKind, column: u16, row: u16) {
    app.handle_mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    });
}

#[test]
fn launch_stops_at_main_and_renders_the_session() {
    let source = write_source("tdbg_it_launch.c", 30);
    let mut backend = ScriptedBackend::stopping_at(source.clone(), 15);
    backend.variables = vec![int_var("argc", "1"), int_var("total", "42")];

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());

    // Before launch: no frame anywhere.
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);
    assert!(text.contains("No frame selected."));
    assert!(text.contains("Status: Not Running"));

    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);

    // The automatic main breakpoint was inserted and logged.
    assert!(text.contains("1: main"));
    assert!(text.contains("No breakpoints. Added breakpoint at 'main'"));
    assert!(text.contains("Launched"));

    // Source and variables reflect the stop location.
    assert!(text.contains("line 15"));
    assert!(text.contains("(i) argc = 1"));
    assert!(text.contains("(i) total = 42"));
    assert!(text.contains("Status: Stopped"));

    fs::remove_file(&source).ok();
}

#[test]
fn auto_follow_centers_the_executing_line() {
    let source = write_source("tdbg_it_follow.c", 100);
    let backend = ScriptedBackend::stopping_at(source.clone(), 55);

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());

    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);

    // The pane window centers on line 55: the top of the file is scrolled
    // out, the executing line is visible.
    assert!(text.contains("line 55"));
    assert!(!text.contains("line 1\n"));
    assert!(!text.contains("   1 line 1"));

    fs::remove_file(&source).ok();
}

#[test]
fn wheel_scrolling_moves_the_source_window() {
    let source = write_source("tdbg_it_wheel.c", 100);
    let backend = ScriptedBackend::stopping_at(source.clone(), 55);

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());
    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();

    // Scroll all the way back to the top of the file.
    for _ in 0..100 {
        wheel(&mut app, MouseEventKind::ScrollUp, 5, 5);
    }
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);
    assert!(text.contains("   1 line 1"));

    // The executing line keeps its place on the next stop only; with the
    // same pc the manual position survives re-renders.
    app.draw(&mut terminal).unwrap();
    assert!(buffer_text(&terminal).contains("   1 line 1"));

    fs::remove_file(&source).ok();
}

#[test]
fn missing_source_falls_back_to_disassembly() {
    let mut backend =
        ScriptedBackend::stopping_at(PathBuf::from("/definitely/missing/lib.c"), 1);
    backend.disassembly = vec![
        Instruction {
            address: 0x4011_36,
            text: "mov eax, 0x0".to_string(),
        },
        Instruction {
            address: 0x4011_3b,
            text: "ret".to_string(),
        },
    ];

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());
    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);

    assert!(text.contains("Could not open source: /definitely/missing/lib.c"));
    assert!(text.contains("Function: main"));
    assert!(text.contains("mov eax, 0x0"));
    assert!(text.contains("ret"));
}

#[test]
fn input_mode_renders_prompt_and_seeded_buffer() {
    let source = write_source("tdbg_it_prompt.c", 20);
    let backend = ScriptedBackend::stopping_at(source.clone(), 5);

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());
    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();

    press(&mut app, KeyCode::Char('b'));
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);
    assert!(text.contains("Input (Esc to Cancel)"));
    assert!(text.contains("Add Breakpoint: tdbg_it_prompt.c:"));
    assert!(text.contains("Enter=Confirm, Esc=Cancel"));

    // Cancel restores the log view.
    press(&mut app, KeyCode::Esc);
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);
    assert!(text.contains("Command & Log"));

    fs::remove_file(&source).ok();
}

#[test]
fn failed_evaluation_is_logged_and_session_survives() {
    let source = write_source("tdbg_it_eval.c", 20);
    let backend = ScriptedBackend::stopping_at(source.clone(), 5);

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut app = App::new(backend, LaunchSpec::default());
    press(&mut app, KeyCode::Char('r'));
    app.draw(&mut terminal).unwrap();

    press(&mut app, KeyCode::Char('p'));
    for c in "bogus".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    app.draw(&mut terminal).unwrap();
    let text = buffer_text(&terminal);

    assert!(text.contains("Error evaluating 'bogus': cannot evaluate 'bogus'"));
    assert!(text.contains("Status: Stopped"));
    assert!(!app.should_quit());

    fs::remove_file(&source).ok();
}
