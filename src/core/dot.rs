// src/core/dot.rs
//! Graphviz DOT export of an AST.
//!
//! Each live node is declared at most once: a pointer-identity map hands
//! back the assigned id if a node is ever reached twice. Edges carry the
//! structural role of the child ("left", "then_block", "arg[2]", ...).
//! Grouping constructs without an AST node of their own (elif clauses,
//! dict entries) get synthetic nodes so the rendered tree stays readable.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::core::ast::AstNode;

pub struct DotGenerator {
    counter: usize,
    ids: HashMap<usize, String>,
    out: String,
}

impl Default for DotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DotGenerator {
    pub fn new() -> Self {
        Self {
            counter: 0,
            ids: HashMap::new(),
            out: String::new(),
        }
    }

    /// Writes the graph for `root` to `path`. The file is created before
    /// any traversal so an unwritable path fails fast; the caller treats
    /// the failure as non-fatal.
    pub fn generate(&mut self, root: &AstNode, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        let text = self.render(root);
        file.write_all(text.as_bytes())
    }

    /// Produces the DOT text without touching the filesystem.
    pub fn render(&mut self, root: &AstNode) -> String {
        self.counter = 0;
        self.ids.clear();
        self.out.clear();
        self.out.push_str("digraph AST {\n");
        self.out
            .push_str("  node [shape=box, style=filled, fillcolor=lightblue];\n");
        self.visit(root, Option::None, "");
        self.out.push_str("}\n");
        std::mem::take(&mut self.out)
    }

    fn visit(&mut self, node: &AstNode, parent: Option<&str>, role: &str) {
        let key = node as *const AstNode as usize;
        if let Some(existing) = self.ids.get(&key) {
            let existing = existing.clone();
            self.emit_edge(parent, &existing, role);
            return;
        }
        let id = self.fresh_id();
        self.ids.insert(key, id.clone());
        let label = label_for(node);
        self.declare(&id, &label);
        self.emit_edge(parent, &id, role);
        self.visit_children(node, &id);
    }

    fn fresh_id(&mut self) -> String {
        let id = format!("node{}", self.counter);
        self.counter += 1;
        id
    }

    fn declare(&mut self, id: &str, label: &str) {
        self.out
            .push_str(&format!("  \"{}\" [label=\"{}\"];\n", id, escape_label(label)));
    }

    fn emit_edge(&mut self, parent: Option<&str>, child: &str, role: &str) {
        if let Some(parent) = parent {
            if parent != child {
                self.out.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    parent,
                    child,
                    escape_label(role)
                ));
            }
        }
    }

    /// Synthetic grouping node with no AST counterpart.
    fn conceptual(&mut self, parent: &str, role: &str, line: usize) -> String {
        let id = self.fresh_id();
        self.declare(&id, &format!("{}\nline {}", role, line));
        self.emit_edge(Some(parent), &id, role);
        id
    }

    fn visit_children(&mut self, node: &AstNode, id: &str) {
        use AstNode::*;
        match node {
            Program { body, .. } | Block { statements: body, .. } => {
                for (i, stmt) in body.iter().enumerate() {
                    self.visit(stmt, Some(id), &format!("stmt[{}]", i));
                }
            }
            FunctionDef {
                params,
                returns,
                body,
                ..
            } => {
                for (i, param) in params.iter().enumerate() {
                    self.visit(param, Some(id), &format!("param[{}]", i));
                }
                if let Some(returns) = returns {
                    self.visit(returns, Some(id), "returns");
                }
                self.visit(body, Some(id), "body");
            }
            ClassDef { bases, body, .. } => {
                for (i, base) in bases.iter().enumerate() {
                    self.visit(base, Some(id), &format!("base[{}]", i));
                }
                self.visit(body, Some(id), "body");
            }
            If {
                condition,
                then_block,
                elif_clauses,
                else_block,
                ..
            } => {
                self.visit(condition, Some(id), "condition");
                self.visit(then_block, Some(id), "then_block");
                for (i, (clause_cond, clause_block)) in elif_clauses.iter().enumerate() {
                    let group = self.conceptual(id, &format!("elif[{}]", i), clause_cond.line());
                    self.visit(clause_cond, Some(group.as_str()), "condition");
                    self.visit(clause_block, Some(group.as_str()), "block");
                }
                if let Some(else_block) = else_block {
                    self.visit(else_block, Some(id), "else_block");
                }
            }
            While {
                condition, body, ..
            } => {
                self.visit(condition, Some(id), "condition");
                self.visit(body, Some(id), "body");
            }
            For {
                target,
                iterable,
                body,
                ..
            } => {
                self.visit(target, Some(id), "target");
                self.visit(iterable, Some(id), "iterable");
                self.visit(body, Some(id), "body");
            }
            Try {
                body,
                handlers,
                else_block,
                finally_block,
                ..
            } => {
                self.visit(body, Some(id), "body");
                for (i, handler) in handlers.iter().enumerate() {
                    self.visit(handler, Some(id), &format!("handler[{}]", i));
                }
                if let Some(else_block) = else_block {
                    self.visit(else_block, Some(id), "else_block");
                }
                if let Some(finally_block) = finally_block {
                    self.visit(finally_block, Some(id), "finally_block");
                }
            }
            Return { value, .. } => {
                if let Some(value) = value {
                    self.visit(value, Some(id), "value");
                }
            }
            Raise { exc, .. } => {
                if let Some(exc) = exc {
                    self.visit(exc, Some(id), "exc");
                }
            }
            Import { names, .. } | ImportFrom { names, .. } => {
                for (i, name) in names.iter().enumerate() {
                    self.visit(name, Some(id), &format!("name[{}]", i));
                }
            }
            Assign { targets, value, .. } => {
                for (i, target) in targets.iter().enumerate() {
                    self.visit(target, Some(id), &format!("target[{}]", i));
                }
                self.visit(value, Some(id), "value");
            }
            AugAssign { target, value, .. } => {
                self.visit(target, Some(id), "target");
                self.visit(value, Some(id), "value");
            }
            ExprStmt { value, .. } => self.visit(value, Some(id), "value"),
            BoolOp { left, right, .. }
            | Comparison { left, right, .. }
            | BinaryOp { left, right, .. } => {
                self.visit(left, Some(id), "left");
                self.visit(right, Some(id), "right");
            }
            UnaryOp { operand, .. } => self.visit(operand, Some(id), "operand"),
            Call { callee, args, .. } => {
                self.visit(callee, Some(id), "callee");
                for (i, arg) in args.iter().enumerate() {
                    self.visit(arg, Some(id), &format!("arg[{}]", i));
                }
            }
            Attribute { object, .. } => self.visit(object, Some(id), "object"),
            Subscript { object, index, .. } => {
                self.visit(object, Some(id), "object");
                self.visit(index, Some(id), "index");
            }
            TupleLiteral { elements, .. }
            | ListLiteral { elements, .. }
            | SetLiteral { elements, .. } => {
                for (i, element) in elements.iter().enumerate() {
                    self.visit(element, Some(id), &format!("elt[{}]", i));
                }
            }
            DictLiteral { pairs, .. } => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    let group = self.conceptual(id, &format!("pair[{}]", i), key.line());
                    self.visit(key, Some(group.as_str()), "key");
                    self.visit(value, Some(group.as_str()), "value");
                }
            }
            Parameter { default, .. } => {
                if let Some(default) = default {
                    self.visit(default, Some(id), "default");
                }
            }
            KeywordArg { value, .. } => self.visit(value, Some(id), "value"),
            ExceptHandler {
                exc_type, body, ..
            } => {
                if let Some(exc_type) = exc_type {
                    self.visit(exc_type, Some(id), "type");
                }
                self.visit(body, Some(id), "body");
            }
            Global { .. }
            | Nonlocal { .. }
            | Pass { .. }
            | Break { .. }
            | Continue { .. }
            | Name { .. }
            | NumberLiteral { .. }
            | StringLiteral { .. }
            | BoolLiteral { .. }
            | NoneLiteral { .. }
            | ImportAlias { .. } => {}
        }
    }
}

/// Node label: variant name, an optional detail, and the source line.
fn label_for(node: &AstNode) -> String {
    use AstNode::*;
    let detail = match node {
        FunctionDef { name, .. }
        | ClassDef { name, .. }
        | Attribute { name, .. }
        | Name { name, .. }
        | KeywordArg { name, .. }
        | Parameter { name, .. } => format!(" '{}'", name),
        ImportFrom { module, .. } => format!(" '{}'", module),
        ImportAlias { name, alias, .. } => match alias {
            Some(alias) => format!(" '{} as {}'", name, alias),
            Option::None => format!(" '{}'", name),
        },
        ExceptHandler { alias: Some(alias), .. } => format!(" 'as {}'", alias),
        BoolOp { op, .. }
        | UnaryOp { op, .. }
        | Comparison { op, .. }
        | BinaryOp { op, .. }
        | AugAssign { op, .. } => format!(" '{}'", op),
        NumberLiteral { value, .. } => format!(" {}", value),
        StringLiteral { value, .. } => format!(" {}", value),
        BoolLiteral { value, .. } => format!(" {}", value),
        Global { names, .. } | Nonlocal { names, .. } => format!(" '{}'", names.join(", ")),
        _ => String::new(),
    };
    format!("{}{}\nline {}", node.node_name(), detail, node.line())
}

/// Fixed substitution table for DOT-unsafe characters.
fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '<' => escaped.push_str("\\<"),
            '>' => escaped.push_str("\\>"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_dot_unsafe_characters() {
        assert_eq!(escape_label("a\"b"), "a\\\"b");
        assert_eq!(escape_label("x\ny"), "x\\ny");
        assert_eq!(escape_label("<{}>"), "\\<\\{\\}\\>");
        assert_eq!(escape_label("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn render_wraps_in_digraph() {
        let root = AstNode::Program {
            body: vec![AstNode::Pass { line: 1 }],
            line: 1,
        };
        let text = DotGenerator::new().render(&root);
        assert!(text.starts_with("digraph AST {\n"));
        assert!(text.trim_end().ends_with('}'));
        assert!(text.contains("node [shape=box, style=filled, fillcolor=lightblue];"));
        assert!(text.contains("\"node0\""));
        assert!(text.contains("Pass"));
    }

    #[test]
    fn string_detail_is_escaped_in_labels() {
        let root = AstNode::Program {
            body: vec![AstNode::ExprStmt {
                value: Box::new(AstNode::StringLiteral {
                    value: "\"hi\"".into(),
                    line: 1,
                }),
                line: 1,
            }],
            line: 1,
        };
        let text = DotGenerator::new().render(&root);
        assert!(text.contains("StringLiteral \\\"hi\\\""));
    }
}
