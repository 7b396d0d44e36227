//! Debug backend capability surface
//!
//! The UI layer never talks to a debug engine directly. Everything it needs —
//! launching, stepping, breakpoints, frames, variables, expression
//! evaluation, disassembly — goes through the [`DebugBackend`] trait, and the
//! data types in this module are the only shapes that cross the boundary.
//!
//! The shipped implementation is the GDB/MI driver in [`gdb`]; tests use a
//! scripted stand-in.

pub mod gdb;

use rustc_hash::FxHashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Lifecycle of the debuggee process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No process has been launched yet.
    NotStarted,
    /// The process is executing.
    Running,
    /// The process is stopped at a breakpoint or after a step.
    Stopped,
    /// The process has exited (or was killed).
    Exited,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "Not Running"),
            RunState::Running => write!(f, "Running"),
            RunState::Stopped => write!(f, "Stopped"),
            RunState::Exited => write!(f, "Exited"),
        }
    }
}

/// Source position of a stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
}

/// The selected frame of the stopped thread, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub function: String,
    /// `None` when the frame has no line-table entry (e.g. stripped libc).
    pub source: Option<SourceLocation>,
    /// Program-counter load address.
    pub pc: u64,
}

/// Canonical classification of a variable's type, after the backend has
/// resolved any aliasing to the underlying type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Pointer,
    Reference,
    Array,
    Integer,
    Character,
    Floating,
    Boolean,
    Struct,
    Enum,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// The type name as the debug engine spells it.
    pub name: String,
    pub class: TypeClass,
}

/// One node of the hierarchical variable tree for the selected frame.
///
/// Children are ordered as the backend reports them; structured types recurse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    pub name: String,
    pub ty: TypeInfo,
    /// False when the engine could not read the value.
    pub valid: bool,
    /// Formatted value or summary; `None` for aggregates without one.
    pub value: Option<String>,
    pub children: Vec<VariableNode>,
}

/// Read-only projection of one backend breakpoint, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointView {
    pub id: u32,
    /// Resolved symbol and/or `file:line` label.
    pub label: String,
}

/// One disassembled instruction for the no-source fallback view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u64,
    /// Mnemonic plus operands.
    pub text: String,
}

/// Everything needed to launch the debuggee.
#[derive(Debug, Clone, Default)]
pub struct LaunchSpec {
    pub args: Vec<String>,
    pub env: FxHashMap<String, String>,
    pub cwd: Option<PathBuf>,
}

/// A user-entered breakpoint specifier, classified but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointRequest {
    /// Break at `file:line`.
    Location { file: String, line: u32 },
    /// Break on a function or symbol name.
    Symbol { name: String },
}

impl BreakpointRequest {
    /// Classify a user string as a location or symbol request.
    ///
    /// The last `:` wins: if one exists, is not the final character, and
    /// everything after it is decimal digits, the input is `file:line`.
    /// Anything else is a symbol name. Classification never fails; whether
    /// the request resolves to a real location is the backend's call.
    pub fn parse(input: &str) -> Self {
        if let Some(colon) = input.rfind(':') {
            let suffix = &input[colon + 1..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(line) = suffix.parse::<u32>() {
                    return BreakpointRequest::Location {
                        file: input[..colon].to_string(),
                        line,
                    };
                }
            }
        }
        BreakpointRequest::Symbol {
            name: input.to_string(),
        }
    }
}

impl fmt::Display for BreakpointRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointRequest::Location { file, line } => write!(f, "{}:{}", file, line),
            BreakpointRequest::Symbol { name } => write!(f, "{}", name),
        }
    }
}

/// Errors surfaced by a backend implementation.
#[derive(Debug)]
pub enum BackendError {
    /// The debug engine process could not be started.
    Spawn(io::Error),
    /// The engine's reply could not be understood, or it went away.
    Protocol(String),
    /// The engine rejected a command; carries its message text.
    Command(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Spawn(e) => write!(f, "failed to start debug engine: {}", e),
            BackendError::Protocol(msg) => write!(f, "debug engine protocol error: {}", msg),
            BackendError::Command(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<io::Error> for BackendError {
    fn from(e: io::Error) -> Self {
        BackendError::Protocol(e.to_string())
    }
}

/// The capability interface the UI consumes.
///
/// Every mutating call is synchronous: it returns only once the debuggee has
/// stopped again or exited, so the single-threaded event loop never observes
/// a half-finished transition.
pub trait DebugBackend {
    /// Launch the debuggee. Blocks until the first stop or exit.
    fn launch(&mut self, spec: &LaunchSpec) -> Result<(), BackendError>;

    fn run_state(&self) -> RunState;

    /// Continue a stopped process until the next stop or exit.
    fn resume(&mut self) -> Result<(), BackendError>;
    fn step_over(&mut self) -> Result<(), BackendError>;
    fn step_into(&mut self) -> Result<(), BackendError>;
    fn step_out(&mut self) -> Result<(), BackendError>;

    /// Terminate the debuggee. Safe to call in any state.
    fn kill(&mut self);

    /// Create a breakpoint. An unresolvable request is an error carrying the
    /// engine's message.
    fn add_breakpoint(&mut self, req: &BreakpointRequest)
        -> Result<BreakpointView, BackendError>;

    /// Existing breakpoints, in creation order.
    fn breakpoints(&self) -> &[BreakpointView];

    /// The selected frame, when the process is stopped.
    fn selected_frame(&self) -> Option<&FrameView>;

    /// Arguments + locals of the selected frame, with structured children.
    fn variables(&mut self) -> Vec<VariableNode>;

    /// Evaluate a source expression against the selected frame.
    fn evaluate(&mut self, expr: &str) -> Result<VariableNode, BackendError>;

    /// Disassemble `count` instructions starting at `addr`. Used only when
    /// no source text is available for the current location.
    fn disassemble(&mut self, addr: u64, count: usize) -> Vec<Instruction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_line() {
        assert_eq!(
            BreakpointRequest::parse("main.c:42"),
            BreakpointRequest::Location {
                file: "main.c".to_string(),
                line: 42
            }
        );
    }

    #[test]
    fn plain_symbol() {
        assert_eq!(
            BreakpointRequest::parse("foo"),
            BreakpointRequest::Symbol {
                name: "foo".to_string()
            }
        );
    }

    #[test]
    fn trailing_colon_is_a_symbol() {
        assert_eq!(
            BreakpointRequest::parse("main.c:"),
            BreakpointRequest::Symbol {
                name: "main.c:".to_string()
            }
        );
    }

    #[test]
    fn last_colon_wins() {
        assert_eq!(
            BreakpointRequest::parse("a:b:10"),
            BreakpointRequest::Location {
                file: "a:b".to_string(),
                line: 10
            }
        );
    }

    #[test]
    fn non_digit_suffix_is_a_symbol() {
        assert_eq!(
            BreakpointRequest::parse("ns::method"),
            BreakpointRequest::Symbol {
                name: "ns::method".to_string()
            }
        );
    }
}
