//! Semi-structured text dump of a decoded value, the `-o text` output
//! path. One node per line, four-space indentation per nesting level.
//!
//! ```text
//! SEQUENCE {
//!     INTEGER: 5
//!     TEXT: "hi"
//!     BYTES: 2 <00FF>
//!     NULL
//! }
//! ```

use std::fmt::Write as _;

use crate::value::Value;

/// Render a value tree as indented text. The result always ends with a
/// newline.
#[must_use]
pub fn render_text(value: &Value) -> String {
    let mut out = String::new();
    write_node(value, 0, &mut out);
    out
}

fn write_node(value: &Value, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    match value {
        Value::Integer(v) => {
            let _ = writeln!(out, "{indent}INTEGER: {v}");
        }
        Value::Text(text) => {
            let _ = writeln!(out, "{indent}TEXT: {text:?}");
        }
        Value::Bytes(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                let _ = write!(hex, "{byte:02X}");
            }
            let _ = writeln!(out, "{indent}BYTES: {len} <{hex}>", len = bytes.len());
        }
        Value::Null => {
            let _ = writeln!(out, "{indent}NULL");
        }
        Value::Sequence(items) => {
            let _ = writeln!(out, "{indent}SEQUENCE {{");
            for item in items {
                write_node(item, depth + 1, out);
            }
            let _ = writeln!(out, "{indent}}}");
        }
    }
}
