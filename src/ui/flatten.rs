//! Variable-tree flattening
//!
//! Turns the backend's hierarchical [`VariableNode`] tree into the flat line
//! list the variables pane scrolls over. Traversal is pre-order with an
//! explicit work stack and a hard depth cap: nodes deeper than
//! [`MAX_DEPTH`] are silently omitted, which bounds the output even when the
//! backend reports a recursive or cyclic type graph.

use crate::backend::{TypeClass, TypeInfo, VariableNode};
use std::ops::Range;

/// Deepest nesting level that produces output (root = 0).
pub const MAX_DEPTH: usize = 3;

/// One rendered variable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLine {
    pub text: String,
    pub depth: usize,
    /// Byte range of the `(type-char) ` prefix within `text`, highlighted
    /// separately by the pane.
    pub tag: Range<usize>,
}

/// Flatten `roots` into display lines no wider than `width`.
pub fn flatten(roots: &[VariableNode], width: usize) -> Vec<VariableLine> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&VariableNode, usize)> =
        roots.iter().rev().map(|node| (node, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        lines.push(render_line(node, depth, width));
        if depth < MAX_DEPTH {
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    lines
}

/// The single-character tag for a type. Unknown classes fall back to the
/// first character of the type name.
pub fn type_char(ty: &TypeInfo) -> char {
    match ty.class {
        TypeClass::Pointer => 'p',
        TypeClass::Reference => '&',
        TypeClass::Array => 'a',
        TypeClass::Integer => 'i',
        TypeClass::Character => 'c',
        TypeClass::Floating => 'f',
        TypeClass::Boolean => 'b',
        TypeClass::Struct => 's',
        TypeClass::Enum => 'e',
        TypeClass::Other => ty.name.chars().next().unwrap_or('?'),
    }
}

fn render_line(node: &VariableNode, depth: usize, width: usize) -> VariableLine {
    let indent = depth * 2;
    let tag_char = type_char(&node.ty);

    let mut text = " ".repeat(indent);
    text.push('(');
    text.push(tag_char);
    text.push_str(") ");
    let tag = indent..text.len();

    text.push_str(&node.name);
    if !node.valid {
        text.push_str(" = (invalid)");
    } else if let Some(value) = &node.value {
        text.push_str(" = ");
        text.push_str(value);
    }

    VariableLine {
        text: truncate(text, width),
        depth,
        tag,
    }
}

/// Cut a line to `width` characters, ending in `...` when it was longer.
fn truncate(text: String, width: usize) -> String {
    if width < 4 || text.chars().count() <= width {
        return text;
    }
    let mut cut: String = text.chars().take(width - 3).collect();
    cut.push_str("...");
    cut
}
