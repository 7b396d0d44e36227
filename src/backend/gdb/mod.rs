//! GDB/MI subprocess backend
//!
//! Drives a `gdb --interpreter=mi3` child over piped stdin/stdout. Every
//! command is written as one MI line, then records are read until the
//! `(gdb)` prompt acts as the end-of-reply sentinel. Execution commands keep
//! reading past the prompt until the `*stopped` record arrives, so each call
//! returns only once the debuggee has stopped again or exited — the
//! synchronous contract the single-threaded UI relies on.
//!
//! Variable trees are built from varobjs: one `-var-create` per root,
//! `-var-list-children` down to the display depth cap, `-var-delete` on the
//! way out. The debuggee's own output shows up as unparseable raw lines and
//! is skipped.

pub mod mi;

use self::mi::{parse_record, MiRecord, MiValue};
use super::{
    BackendError, BreakpointRequest, BreakpointView, DebugBackend, FrameView, Instruction,
    LaunchSpec, RunState, SourceLocation, TypeClass, TypeInfo, VariableNode,
};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Children are fetched this deep; the UI truncates at the same depth.
const CHILD_DEPTH_LIMIT: usize = 3;

/// How many bytes of code to request per instruction when disassembling.
/// Generous for every ISA gdb targets.
const BYTES_PER_INSN: u64 = 16;

pub struct GdbBackend {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    state: RunState,
    frame: Option<FrameView>,
    breakpoints: Vec<BreakpointView>,
    /// Set by `*stopped`/exit records; lets `exec` tell a fresh stop apart
    /// from the state it was in before the command went out.
    stop_seen: bool,
}

impl GdbBackend {
    /// Spawn the engine and load `target`. Fails if gdb cannot be started or
    /// the target is not a valid executable.
    pub fn new(target: &Path) -> Result<Self, BackendError> {
        let mut child = Command::new("gdb")
            .args(["--interpreter=mi3", "-quiet", "-nx"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(BackendError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BackendError::Protocol("no stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BackendError::Protocol("no stdout handle".to_string()))?;

        let mut backend = GdbBackend {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            state: RunState::NotStarted,
            frame: None,
            breakpoints: Vec::new(),
            stop_seen: false,
        };

        backend.drain_to_prompt()?;
        backend.command("-gdb-set confirm off")?;
        backend
            .command(&format!(
                "-file-exec-and-symbols {}",
                mi_quote(&target.display().to_string())
            ))
            .map_err(|e| match e {
                BackendError::Command(msg) => BackendError::Command(format!(
                    "cannot load target {}: {}",
                    target.display(),
                    msg
                )),
                other => other,
            })?;
        Ok(backend)
    }

    fn send(&mut self, line: &str) -> Result<(), BackendError> {
        tracing::trace!(command = line, "mi send");
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Swallow startup banner output until the first prompt.
    fn drain_to_prompt(&mut self) -> Result<(), BackendError> {
        loop {
            match self.read_record()? {
                Some(MiRecord::Prompt) => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(BackendError::Protocol(
                        "engine exited during startup".to_string(),
                    ))
                }
            }
        }
    }

    /// One line of engine output, parsed. `None` on EOF.
    fn read_record(&mut self) -> Result<Option<MiRecord>, BackendError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_record(&line) {
            Ok(record) => {
                tracing::trace!(?record, "mi recv");
                Ok(Some(record))
            }
            Err(e) => {
                tracing::debug!(line = line.trim_end(), error = %e, "skipping malformed record");
                Ok(Some(MiRecord::Other(line)))
            }
        }
    }

    /// Issue a command and collect its result record, consuming output up to
    /// the prompt. `*stopped` records seen along the way update run state.
    fn command(&mut self, cmd: &str) -> Result<MiValue, BackendError> {
        self.send(cmd)?;
        let mut outcome: Option<Result<MiValue, BackendError>> = None;
        loop {
            match self.read_record()? {
                None => {
                    self.state = RunState::Exited;
                    self.frame = None;
                    return Err(BackendError::Protocol("engine terminated".to_string()));
                }
                Some(MiRecord::Prompt) => {
                    if let Some(result) = outcome {
                        return result;
                    }
                    // Prompt before any result record: keep reading, gdb
                    // interleaves prompts with async output.
                }
                Some(MiRecord::Result { class, fields }) => {
                    outcome = Some(match class.as_str() {
                        "error" => Err(BackendError::Command(
                            fields
                                .str_field("msg")
                                .unwrap_or("unknown engine error")
                                .to_string(),
                        )),
                        _ => Ok(fields),
                    });
                }
                Some(MiRecord::ExecAsync { class, fields }) => {
                    self.apply_exec_async(&class, &fields);
                }
                Some(_) => {}
            }
        }
    }

    /// Issue an execution command and block until the debuggee stops or
    /// exits.
    fn exec(&mut self, cmd: &str) -> Result<(), BackendError> {
        self.stop_seen = false;
        self.command(cmd)?;
        if !self.stop_seen {
            self.state = RunState::Running;
            self.frame = None;
        }
        loop {
            if self.state != RunState::Running {
                return Ok(());
            }
            match self.read_record()? {
                None => {
                    self.state = RunState::Exited;
                    self.frame = None;
                    return Ok(());
                }
                Some(MiRecord::ExecAsync { class, fields }) => {
                    self.apply_exec_async(&class, &fields);
                }
                Some(_) => {}
            }
        }
    }

    fn apply_exec_async(&mut self, class: &str, fields: &MiValue) {
        match class {
            "stopped" => {
                self.stop_seen = true;
                let reason = fields.str_field("reason").unwrap_or("");
                if reason.starts_with("exited") {
                    self.state = RunState::Exited;
                    self.frame = None;
                } else {
                    self.state = RunState::Stopped;
                    self.frame = fields.get("frame").map(parse_frame);
                }
            }
            "running" => {
                self.state = RunState::Running;
                self.frame = None;
            }
            _ => {}
        }
    }

    /// Build one variable subtree from an existing varobj.
    fn varobj_node(
        &mut self,
        varobj: &str,
        display_name: String,
        type_name: String,
        num_children: usize,
        value: Option<String>,
        depth: usize,
    ) -> VariableNode {
        let mut children = Vec::new();
        if num_children > 0 && depth < CHILD_DEPTH_LIMIT {
            if let Ok(fields) =
                self.command(&format!("-var-list-children --all-values {}", varobj))
            {
                if let Some(list) = fields.get("children") {
                    for child in list.items() {
                        let child_id = child.str_field("name").unwrap_or("").to_string();
                        let exp = child.str_field("exp").unwrap_or("?").to_string();
                        let child_type = child.str_field("type").unwrap_or("").to_string();
                        let n = child
                            .str_field("numchild")
                            .and_then(|s| s.parse::<usize>().ok())
                            .unwrap_or(0);
                        let child_value = scalar_value(child.str_field("value"));
                        children.push(self.varobj_node(
                            &child_id,
                            exp,
                            child_type,
                            n,
                            child_value,
                            depth + 1,
                        ));
                    }
                }
            }
        }
        VariableNode {
            name: display_name,
            ty: TypeInfo {
                class: classify_type(&type_name),
                name: type_name,
            },
            valid: true,
            value,
            children,
        }
    }

    /// Create a varobj for `expr`, build its tree, and tear it down again.
    fn expression_node(&mut self, expr: &str, display_name: &str) -> Result<VariableNode, BackendError> {
        let fields = self.command(&format!("-var-create - * {}", mi_quote(expr)))?;
        let varobj = fields
            .str_field("name")
            .ok_or_else(|| BackendError::Protocol("varobj reply without name".to_string()))?
            .to_string();
        let type_name = fields.str_field("type").unwrap_or("").to_string();
        let num_children = fields
            .str_field("numchild")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        let value = scalar_value(fields.str_field("value"));
        let node = self.varobj_node(
            &varobj,
            display_name.to_string(),
            type_name,
            num_children,
            value,
            0,
        );
        let _ = self.command(&format!("-var-delete {}", varobj));
        Ok(node)
    }
}

impl DebugBackend for GdbBackend {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<(), BackendError> {
        if self.state != RunState::NotStarted {
            return Err(BackendError::Command("already launched".to_string()));
        }
        if let Some(cwd) = &spec.cwd {
            self.command(&format!("-environment-cd {}", mi_quote(&cwd.display().to_string())))?;
        }
        for (key, value) in &spec.env {
            self.command(&format!(
                "-interpreter-exec console {}",
                mi_quote(&format!("set environment {}={}", key, value))
            ))?;
        }
        if !spec.args.is_empty() {
            let rendered: Vec<String> = spec.args.iter().map(|a| mi_quote(a)).collect();
            self.command(&format!("-exec-arguments {}", rendered.join(" ")))?;
        }
        self.exec("-exec-run")
    }

    fn run_state(&self) -> RunState {
        self.state
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        self.exec("-exec-continue")
    }

    fn step_over(&mut self) -> Result<(), BackendError> {
        self.exec("-exec-next")
    }

    fn step_into(&mut self) -> Result<(), BackendError> {
        self.exec("-exec-step")
    }

    fn step_out(&mut self) -> Result<(), BackendError> {
        self.exec("-exec-finish")
    }

    fn kill(&mut self) {
        if matches!(self.state, RunState::Running | RunState::Stopped) {
            let _ = self.command("-interpreter-exec console \"kill\"");
            self.state = RunState::Exited;
            self.frame = None;
        }
    }

    fn add_breakpoint(
        &mut self,
        req: &BreakpointRequest,
    ) -> Result<BreakpointView, BackendError> {
        let location = req.to_string();
        let fields = self.command(&format!("-break-insert {}", mi_quote(&location)))?;
        let bkpt = fields
            .get("bkpt")
            .ok_or_else(|| BackendError::Protocol("breakpoint reply without bkpt".to_string()))?;
        let id = bkpt
            .str_field("number")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        let view = BreakpointView {
            id,
            label: breakpoint_label(bkpt),
        };
        self.breakpoints.push(view.clone());
        Ok(view)
    }

    fn breakpoints(&self) -> &[BreakpointView] {
        &self.breakpoints
    }

    fn selected_frame(&self) -> Option<&FrameView> {
        if self.state == RunState::Stopped {
            self.frame.as_ref()
        } else {
            None
        }
    }

    fn variables(&mut self) -> Vec<VariableNode> {
        if self.state != RunState::Stopped {
            return Vec::new();
        }
        let names: Vec<String> = match self.command("-stack-list-variables --no-values") {
            Ok(fields) => fields
                .get("variables")
                .map(|list| {
                    list.items()
                        .iter()
                        .filter_map(|v| v.str_field("name").map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "listing frame variables failed");
                return Vec::new();
            }
        };

        let mut roots = Vec::new();
        for name in names {
            match self.expression_node(&name, &name) {
                Ok(node) => roots.push(node),
                Err(e) => {
                    tracing::debug!(variable = %name, error = %e, "variable unreadable");
                    roots.push(VariableNode {
                        name,
                        ty: TypeInfo {
                            name: String::new(),
                            class: TypeClass::Other,
                        },
                        valid: false,
                        value: None,
                        children: Vec::new(),
                    });
                }
            }
        }
        roots
    }

    fn evaluate(&mut self, expr: &str) -> Result<VariableNode, BackendError> {
        if self.state != RunState::Stopped {
            return Err(BackendError::Command("process is not stopped".to_string()));
        }
        self.expression_node(expr, expr)
    }

    fn disassemble(&mut self, addr: u64, count: usize) -> Vec<Instruction> {
        let end = addr + count as u64 * BYTES_PER_INSN;
        let reply = self.command(&format!(
            "-data-disassemble -s {:#x} -e {:#x} -- 0",
            addr, end
        ));
        let fields = match reply {
            Ok(fields) => fields,
            Err(e) => {
                tracing::debug!(error = %e, "disassembly unavailable");
                return Vec::new();
            }
        };
        fields
            .get("asm_insns")
            .map(|list| {
                list.items()
                    .iter()
                    .take(count)
                    .map(|insn| Instruction {
                        address: insn
                            .str_field("address")
                            .and_then(parse_address)
                            .unwrap_or(0),
                        text: insn.str_field("inst").unwrap_or("??").to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for GdbBackend {
    fn drop(&mut self) {
        // Best-effort teardown on every exit path.
        let _ = self.send("-gdb-exit");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn parse_frame(frame: &MiValue) -> FrameView {
    let file = frame
        .str_field("fullname")
        .or_else(|| frame.str_field("file"))
        .map(PathBuf::from);
    let line = frame
        .str_field("line")
        .and_then(|s| s.parse::<usize>().ok());
    FrameView {
        function: frame.str_field("func").unwrap_or("??").to_string(),
        source: match (file, line) {
            (Some(file), Some(line)) => Some(SourceLocation { file, line }),
            _ => None,
        },
        pc: frame
            .str_field("addr")
            .and_then(parse_address)
            .unwrap_or(0),
    }
}

fn parse_address(text: &str) -> Option<u64> {
    u64::from_str_radix(text.trim_start_matches("0x"), 16).ok()
}

/// Aggregate varobj values are placeholders like `{...}`; only scalars are
/// worth displaying.
fn scalar_value(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") | Some("{...}") => None,
        Some(v) => Some(v.to_string()),
    }
}

/// Human label for a breakpoint, mirroring what the breakpoints pane shows:
/// the function name with `file:line` in parentheses when both are known.
fn breakpoint_label(bkpt: &MiValue) -> String {
    // Multi-location breakpoints report their specifics one level down.
    let detail = bkpt
        .get("locations")
        .map(|locs| locs.items().first().unwrap_or(bkpt))
        .unwrap_or(bkpt);
    let func = detail.str_field("func");
    let place = match (detail.str_field("file"), detail.str_field("line")) {
        (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
        _ => None,
    };
    match (func, place) {
        (Some(func), Some(place)) => format!("{} ({})", func, place),
        (Some(func), None) => func.to_string(),
        (None, Some(place)) => place,
        (None, None) => "???".to_string(),
    }
}

/// Classify a type string the way the variables pane tags it. The engine has
/// already resolved the expression's type; this reduces the spelling to a
/// canonical class.
fn classify_type(name: &str) -> TypeClass {
    let t = name.trim();
    if t.is_empty() {
        return TypeClass::Other;
    }
    if t.ends_with('*') {
        return TypeClass::Pointer;
    }
    if t.ends_with('&') {
        return TypeClass::Reference;
    }
    if t.ends_with(']') {
        return TypeClass::Array;
    }
    let t = t
        .trim_start_matches("const ")
        .trim_start_matches("volatile ");
    if t.starts_with("struct ") || t.starts_with("class ") || t.starts_with("union ") {
        return TypeClass::Struct;
    }
    if t.starts_with("enum ") {
        return TypeClass::Enum;
    }
    let has_word = |w: &str| t.split([' ', '\t']).any(|part| part == w);
    if has_word("bool") || has_word("_Bool") {
        TypeClass::Boolean
    } else if has_word("char") {
        TypeClass::Character
    } else if has_word("float") || has_word("double") {
        TypeClass::Floating
    } else if has_word("int")
        || has_word("long")
        || has_word("short")
        || has_word("unsigned")
        || has_word("signed")
    {
        TypeClass::Integer
    } else {
        TypeClass::Other
    }
}

/// Wrap an argument in MI double quotes, escaping the payload.
fn mi_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::gdb::mi::parse_record;

    fn fields_of(line: &str) -> MiValue {
        match parse_record(line).unwrap() {
            MiRecord::Result { fields, .. } | MiRecord::ExecAsync { fields, .. } => fields,
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_classify_scalars() {
        assert_eq!(classify_type("int"), TypeClass::Integer);
        assert_eq!(classify_type("unsigned long"), TypeClass::Integer);
        assert_eq!(classify_type("short"), TypeClass::Integer);
        assert_eq!(classify_type("char"), TypeClass::Character);
        assert_eq!(classify_type("unsigned char"), TypeClass::Character);
        assert_eq!(classify_type("float"), TypeClass::Floating);
        assert_eq!(classify_type("double"), TypeClass::Floating);
        assert_eq!(classify_type("bool"), TypeClass::Boolean);
        assert_eq!(classify_type("_Bool"), TypeClass::Boolean);
    }

    #[test]
    fn test_classify_compound() {
        assert_eq!(classify_type("char *"), TypeClass::Pointer);
        assert_eq!(classify_type("int **"), TypeClass::Pointer);
        assert_eq!(classify_type("std::string &"), TypeClass::Reference);
        assert_eq!(classify_type("int [8]"), TypeClass::Array);
        assert_eq!(classify_type("struct point"), TypeClass::Struct);
        assert_eq!(classify_type("const struct point"), TypeClass::Struct);
        assert_eq!(classify_type("class Widget"), TypeClass::Struct);
        assert_eq!(classify_type("enum color"), TypeClass::Enum);
        assert_eq!(classify_type("size_t"), TypeClass::Other);
        assert_eq!(classify_type(""), TypeClass::Other);
    }

    #[test]
    fn test_parse_stop_frame() {
        let fields = fields_of(concat!(
            r#"*stopped,reason="breakpoint-hit","#,
            r#"frame={addr="0x00401136",func="main",file="x.c","#,
            r#"fullname="/tmp/x.c",line="3"}"#
        ));
        let frame = parse_frame(fields.get("frame").unwrap());
        assert_eq!(frame.function, "main");
        assert_eq!(frame.pc, 0x401136);
        let source = frame.source.unwrap();
        assert_eq!(source.file, PathBuf::from("/tmp/x.c"));
        assert_eq!(source.line, 3);
    }

    #[test]
    fn test_frame_without_source() {
        let fields = fields_of(r#"*stopped,frame={addr="0x7f00deadbeef",func="??"}"#);
        let frame = parse_frame(fields.get("frame").unwrap());
        assert!(frame.source.is_none());
        assert_eq!(frame.pc, 0x7f00_dead_beef);
    }

    #[test]
    fn test_breakpoint_label_from_insert_reply() {
        let fields = fields_of(concat!(
            r#"^done,bkpt={number="1",addr="0x401130",func="compute","#,
            r#"file="calc.c",line="7"}"#
        ));
        assert_eq!(
            breakpoint_label(fields.get("bkpt").unwrap()),
            "compute (calc.c:7)"
        );
    }

    #[test]
    fn test_breakpoint_label_fallbacks() {
        let fields = fields_of(r#"^done,bkpt={number="3",addr="0x1000",func="start"}"#);
        assert_eq!(breakpoint_label(fields.get("bkpt").unwrap()), "start");
        let fields = fields_of(r#"^done,bkpt={number="4",addr="0x1000"}"#);
        assert_eq!(breakpoint_label(fields.get("bkpt").unwrap()), "???");
    }

    #[test]
    fn test_scalar_value_filters_aggregates() {
        assert_eq!(scalar_value(Some("42")), Some("42".to_string()));
        assert_eq!(scalar_value(Some("{...}")), None);
        assert_eq!(scalar_value(Some("")), None);
        assert_eq!(scalar_value(None), None);
    }

    #[test]
    fn test_mi_quote_escapes() {
        assert_eq!(mi_quote("plain"), "\"plain\"");
        assert_eq!(mi_quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(mi_quote(r"a\b"), r#""a\\b""#);
    }
}
