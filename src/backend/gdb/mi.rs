//! Parser for GDB/MI output records
//!
//! Converts one line of MI output into an [`MiRecord`]. MI values form a
//! small recursive grammar: C strings, `{...}` tuples of `key=value` results,
//! and `[...]` lists whose elements are values or named results. Stream
//! records and raw inferior output are passed through untyped so the session
//! layer can skip them.

use std::fmt;

/// One MI value: the payload of a result record or async record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiValue {
    /// C-string constant, unescaped.
    Str(String),
    /// `{key=value,...}` — field order preserved.
    Tuple(Vec<(String, MiValue)>),
    /// `[...]` — element order preserved; named elements keep only the value.
    List(Vec<MiValue>),
}

impl MiValue {
    /// Look up a tuple field by key.
    pub fn get(&self, key: &str) -> Option<&MiValue> {
        match self {
            MiValue::Tuple(fields) => {
                fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MiValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Tuple field as a string, when both layers are present.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MiValue::as_str)
    }

    /// List elements; empty for non-lists.
    pub fn items(&self) -> &[MiValue] {
        match self {
            MiValue::List(items) => items,
            _ => &[],
        }
    }
}

/// One line of MI output, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiRecord {
    /// `^class,fields` — reply to the command just issued.
    Result { class: String, fields: MiValue },
    /// `*class,fields` — execution state change (e.g. `*stopped`).
    ExecAsync { class: String, fields: MiValue },
    /// `=class,fields` — engine notification.
    NotifyAsync { class: String, fields: MiValue },
    /// `~"..."`, `&"..."`, `@"..."` — console/log/target stream text.
    Stream(String),
    /// The `(gdb)` ready prompt.
    Prompt,
    /// Anything else, typically raw inferior output.
    Other(String),
}

/// Parse failure with the byte offset where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for MiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

impl std::error::Error for MiError {}

/// Parse one line of MI output.
///
/// Malformed record payloads are reported as errors; lines that are not MI
/// records at all come back as [`MiRecord::Other`].
pub fn parse_record(line: &str) -> Result<MiRecord, MiError> {
    let trimmed = line.trim_end();
    if trimmed == "(gdb)" || trimmed == "(gdb) " {
        return Ok(MiRecord::Prompt);
    }

    let mut bytes = trimmed.bytes();
    match bytes.next() {
        Some(b'^') | Some(b'*') | Some(b'=') => {
            let marker = trimmed.as_bytes()[0];
            let rest = &trimmed[1..];
            let (class, fields) = parse_class_and_fields(rest)?;
            Ok(match marker {
                b'^' => MiRecord::Result { class, fields },
                b'*' => MiRecord::ExecAsync { class, fields },
                _ => MiRecord::NotifyAsync { class, fields },
            })
        }
        Some(b'~') | Some(b'&') | Some(b'@') => {
            let mut cursor = Cursor::new(&trimmed[1..]);
            let text = cursor.parse_c_string()?;
            Ok(MiRecord::Stream(text))
        }
        _ => Ok(MiRecord::Other(trimmed.to_string())),
    }
}

fn parse_class_and_fields(input: &str) -> Result<(String, MiValue), MiError> {
    let (class, rest) = match input.find(',') {
        Some(comma) => (&input[..comma], &input[comma + 1..]),
        None => (input, ""),
    };
    if rest.is_empty() {
        return Ok((class.to_string(), MiValue::Tuple(Vec::new())));
    }
    let mut cursor = Cursor::new(rest);
    let fields = cursor.parse_results()?;
    Ok((class.to_string(), MiValue::Tuple(fields)))
}

/// Byte cursor over one record's payload.
struct Cursor<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor {
            input: input.as_bytes(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.position += 1;
        }
        b
    }

    fn error(&self, message: &str) -> MiError {
        MiError {
            position: self.position,
            message: message.to_string(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), MiError> {
        if self.peek() == Some(byte) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    /// `key=value` pairs separated by commas, until end of input or a
    /// closing delimiter.
    fn parse_results(&mut self) -> Result<Vec<(String, MiValue)>, MiError> {
        let mut fields = Vec::new();
        loop {
            let key = self.parse_key()?;
            self.expect(b'=')?;
            let value = self.parse_value()?;
            fields.push((key, value));
            match self.peek() {
                Some(b',') => {
                    self.position += 1;
                }
                Some(b'}') | Some(b']') | None => break,
                Some(other) => {
                    return Err(
                        self.error(&format!("unexpected '{}' after result", other as char))
                    )
                }
            }
        }
        Ok(fields)
    }

    fn parse_key(&mut self) -> Result<String, MiError> {
        let start = self.position;
        while let Some(b) = self.peek() {
            if b == b'=' || b == b',' || b == b'{' || b == b'}' || b == b'[' || b == b']' {
                break;
            }
            self.position += 1;
        }
        if self.position == start {
            return Err(self.error("expected key"));
        }
        // Keys are ASCII identifiers with dashes; the slice is valid UTF-8.
        Ok(String::from_utf8_lossy(&self.input[start..self.position]).into_owned())
    }

    fn parse_value(&mut self) -> Result<MiValue, MiError> {
        match self.peek() {
            Some(b'"') => Ok(MiValue::Str(self.parse_c_string()?)),
            Some(b'{') => self.parse_tuple(),
            Some(b'[') => self.parse_list(),
            _ => Err(self.error("expected value")),
        }
    }

    fn parse_tuple(&mut self) -> Result<MiValue, MiError> {
        self.expect(b'{')?;
        if self.peek() == Some(b'}') {
            self.position += 1;
            return Ok(MiValue::Tuple(Vec::new()));
        }
        let fields = self.parse_results()?;
        self.expect(b'}')?;
        Ok(MiValue::Tuple(fields))
    }

    fn parse_list(&mut self) -> Result<MiValue, MiError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        if self.peek() == Some(b']') {
            self.position += 1;
            return Ok(MiValue::List(items));
        }
        loop {
            match self.peek() {
                Some(b'"') | Some(b'{') | Some(b'[') => items.push(self.parse_value()?),
                _ => {
                    // Named element (`frame={...}`): keep the value only.
                    self.parse_key()?;
                    self.expect(b'=')?;
                    items.push(self.parse_value()?);
                }
            }
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => break,
                _ => return Err(self.error("unterminated list")),
            }
        }
        Ok(MiValue::List(items))
    }

    fn parse_c_string(&mut self) -> Result<String, MiError> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push('\n'),
                    Some(b't') => out.push('\t'),
                    Some(b'r') => out.push('\r'),
                    Some(b'"') => out.push('"'),
                    Some(b'\\') => out.push('\\'),
                    Some(other) => {
                        // Unknown escape: keep it verbatim.
                        out.push('\\');
                        out.push(other as char);
                    }
                    None => return Err(self.error("unterminated escape")),
                },
                Some(b) if b < 0x80 => out.push(b as char),
                Some(b) => {
                    // Re-assemble multi-byte UTF-8 sequences.
                    let start = self.position - 1;
                    let len = utf8_len(b);
                    let end = (start + len).min(self.input.len());
                    out.push_str(&String::from_utf8_lossy(&self.input[start..end]));
                    self.position = end;
                }
            }
        }
        Ok(out)
    }
}

fn utf8_len(first: u8) -> usize {
    if first >= 0xF0 {
        4
    } else if first >= 0xE0 {
        3
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_plain_output() {
        assert_eq!(parse_record("(gdb)").unwrap(), MiRecord::Prompt);
        assert!(matches!(
            parse_record("hello from the inferior").unwrap(),
            MiRecord::Other(ref s) if s == "hello from the inferior"
        ));
    }

    #[test]
    fn test_bare_result_record() {
        let rec = parse_record("^running").unwrap();
        assert!(matches!(rec, MiRecord::Result { ref class, .. } if class == "running"));
    }

    #[test]
    fn test_error_record_message() {
        let rec = parse_record(r#"^error,msg="No symbol \"foo\" in current context.""#)
            .unwrap();
        match rec {
            MiRecord::Result { class, fields } => {
                assert_eq!(class, "error");
                assert_eq!(
                    fields.str_field("msg"),
                    Some(r#"No symbol "foo" in current context."#)
                );
            }
            other => panic!("wrong record: {:?}", other),
        }
    }

    #[test]
    fn test_stopped_record_frame() {
        let line = concat!(
            r#"*stopped,reason="breakpoint-hit",disp="keep",bkptno="1","#,
            r#"frame={addr="0x0000555555555189",func="main","#,
            r#"args=[{name="argc",value="1"}],file="main.c","#,
            r#"fullname="/home/u/main.c",line="12"},thread-id="1""#
        );
        let rec = parse_record(line).unwrap();
        match rec {
            MiRecord::ExecAsync { class, fields } => {
                assert_eq!(class, "stopped");
                assert_eq!(fields.str_field("reason"), Some("breakpoint-hit"));
                let frame = fields.get("frame").unwrap();
                assert_eq!(frame.str_field("func"), Some("main"));
                assert_eq!(frame.str_field("line"), Some("12"));
                let args = frame.get("args").unwrap();
                assert_eq!(args.items().len(), 1);
                assert_eq!(args.items()[0].str_field("name"), Some("argc"));
            }
            other => panic!("wrong record: {:?}", other),
        }
    }

    #[test]
    fn test_breakpoint_record() {
        let line = concat!(
            r#"^done,bkpt={number="2",type="breakpoint",disp="keep","#,
            r#"enabled="y",addr="0x0000000000401130",func="compute","#,
            r#"file="calc.c",fullname="/tmp/calc.c",line="7",thread-groups=["i1"],"#,
            r#"times="0",original-location="calc.c:7"}"#
        );
        let rec = parse_record(line).unwrap();
        match rec {
            MiRecord::Result { class, fields } => {
                assert_eq!(class, "done");
                let bkpt = fields.get("bkpt").unwrap();
                assert_eq!(bkpt.str_field("number"), Some("2"));
                assert_eq!(bkpt.str_field("func"), Some("compute"));
                assert_eq!(
                    bkpt.get("thread-groups").unwrap().items()[0].as_str(),
                    Some("i1")
                );
            }
            other => panic!("wrong record: {:?}", other),
        }
    }

    #[test]
    fn test_named_list_elements() {
        let line = r#"^done,stack=[frame={level="0",func="inner"},frame={level="1",func="main"}]"#;
        let rec = parse_record(line).unwrap();
        match rec {
            MiRecord::Result { fields, .. } => {
                let stack = fields.get("stack").unwrap();
                assert_eq!(stack.items().len(), 2);
                assert_eq!(stack.items()[1].str_field("func"), Some("main"));
            }
            other => panic!("wrong record: {:?}", other),
        }
    }

    #[test]
    fn test_console_stream() {
        let rec = parse_record(r#"~"Reading symbols from a.out...\n""#).unwrap();
        assert!(matches!(
            rec,
            MiRecord::Stream(ref s) if s == "Reading symbols from a.out...\n"
        ));
    }

    #[test]
    fn test_empty_tuple_and_list() {
        let rec = parse_record(r#"^done,found={},values=[]"#).unwrap();
        match rec {
            MiRecord::Result { fields, .. } => {
                assert_eq!(fields.get("found"), Some(&MiValue::Tuple(Vec::new())));
                assert_eq!(fields.get("values"), Some(&MiValue::List(Vec::new())));
            }
            other => panic!("wrong record: {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        assert!(parse_record(r#"^done,msg="oops"#).is_err());
    }
}
