// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SCAD text emission

use crate::ast::{Node, Value};
use crate::error::{Result, ScadError};

/// Spaces per nesting level unless configured otherwise
pub const DEFAULT_INDENT: usize = 4;

/// One argument of an emitted call
#[derive(Debug, Clone, PartialEq)]
pub enum ScadArg {
    Positional(Value),
    Named(String, Value),
}

impl ScadArg {
    pub fn positional(value: impl Into<Value>) -> Self {
        ScadArg::Positional(value.into())
    }

    pub fn named(key: &str, value: impl Into<Value>) -> Self {
        ScadArg::Named(key.to_string(), value.into())
    }

    pub fn render(&self) -> Result<String> {
        match self {
            ScadArg::Positional(value) => format_value(value),
            ScadArg::Named(key, value) => Ok(format!("{key}={}", format_value(value)?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl RenderOptions {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    pub fn margin(&self, level: usize) -> String {
        " ".repeat(self.indent * level)
    }
}

/// Render a value as a SCAD literal
pub fn format_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::None => "undef".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Vector(v) => v.to_string(),
        Value::List(items) => {
            let parts = items.iter().map(format_value).collect::<Result<Vec<_>>>()?;
            format!("[{}]", parts.join(", "))
        }
        other => {
            return Err(ScadError::Render(format!(
                "{} values have no SCAD literal",
                other.type_name()
            )))
        }
    })
}

/// Floats always carry a decimal point
pub fn format_float(f: f64) -> String {
    format!("{:?}", f)
}

pub fn format_args(args: &[ScadArg]) -> Result<String> {
    Ok(args
        .iter()
        .map(ScadArg::render)
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// Visibility prefix derived from the node's flags, first match wins
pub fn modifier(node: &Node) -> &'static str {
    let flag = |name: &str| node.field(name).and_then(Value::as_bool).unwrap_or(false);
    if flag("background") {
        "%"
    } else if flag("debug") {
        "#"
    } else if flag("root") {
        "!"
    } else if flag("disable") {
        "*"
    } else {
        ""
    }
}

/// Render the node's children one per line, one level deeper
pub fn render_children(node: &Node, opts: &RenderOptions, level: usize) -> Result<Vec<String>> {
    node.children()
        .iter()
        .map(|child| child.render_at(opts, level + 1))
        .collect()
}

/// Wrap pre-rendered bodies in `name(args) { ... }`, or terminate with `;` when empty
pub fn render_block(
    prefix: &str,
    call: &str,
    body: &[String],
    opts: &RenderOptions,
    level: usize,
) -> String {
    let margin = opts.margin(level);
    if body.is_empty() {
        format!("{margin}{prefix}{call};")
    } else {
        format!("{margin}{prefix}{call} {{\n{}\n{margin}}}", body.join("\n"))
    }
}

/// The generic renderer: `<modifier><name>(<args>)` followed by `;` or a child block
pub fn render_call(node: &Node, opts: &RenderOptions, level: usize) -> Result<String> {
    let name = node.class().scad_name().ok_or_else(|| ScadError::NotRenderable {
        type_name: node.class().name().to_string(),
    })?;
    let args = format_args(&(node.class().scad_args())(node)?)?;
    let body = render_children(node, opts, level)?;
    Ok(render_block(
        modifier(node),
        &format!("{name}({args})"),
        &body,
        opts,
        level,
    ))
}

/// Strip all whitespace so generated code can be compared structurally
pub fn normalize(scad: &str) -> String {
    scad.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whitespace-insensitive equality of two SCAD fragments
pub fn code_eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Vector;

    #[test]
    fn test_literals() {
        assert_eq!(format_value(&Value::Float(20.0)).unwrap(), "20.0");
        assert_eq!(format_value(&Value::Bool(false)).unwrap(), "false");
        assert_eq!(format_value(&Value::None).unwrap(), "undef");
        assert_eq!(format_value(&Value::from("a\"b")).unwrap(), "\"a\\\"b\"");
        assert_eq!(
            format_value(&Value::Vector(Vector::vec3(1.0, 2.0, 3.0))).unwrap(),
            "[1.0, 2.0, 3.0]"
        );
        assert_eq!(
            format_value(&Value::from(vec![vec![0, 1, 2]])).unwrap(),
            "[[0, 1, 2]]"
        );
    }

    #[test]
    fn test_named_args() {
        let args = vec![
            ScadArg::positional(Vector::vec3(1.0, 1.0, 1.0)),
            ScadArg::named("center", true),
        ];
        assert_eq!(format_args(&args).unwrap(), "[1.0, 1.0, 1.0], center=true");
    }

    #[test]
    fn test_code_eq_ignores_whitespace() {
        assert!(code_eq("union() {\n    cube();\n}", "union(){cube();}"));
        assert!(!code_eq("cube();", "sphere();"));
    }
}
