// tests/dot_output.rs
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pyrite::core::lexer::Lexer;
use pyrite::core::parser::Parser;

fn generate(source: &str, dir: &Path) -> String {
    let dot = dir.join("out.dot");
    let mut parser = Parser::with_dot_path(Lexer::new(source), &dot);
    let _ = parser.parse();
    fs::read_to_string(&dot).expect("dot artifact written")
}

fn quoted_parts(line: &str) -> Vec<&str> {
    line.split('"').skip(1).step_by(2).collect()
}

#[test]
fn output_is_a_well_formed_digraph() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = generate("x = 1 + 2\n", dir.path());
    assert!(text.starts_with("digraph AST {\n"));
    assert_eq!(text.trim_end().chars().last(), Some('}'));
    assert!(text.contains("node [shape=box, style=filled, fillcolor=lightblue];"));
}

#[test]
fn every_edge_endpoint_is_declared() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = "\
def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
";
    let text = generate(source, dir.path());

    let mut declared = HashSet::new();
    for line in text.lines() {
        if line.contains("[label=") && !line.contains("->") {
            if let Some(id) = quoted_parts(line).first() {
                declared.insert(id.to_string());
            }
        }
    }
    assert!(!declared.is_empty());

    let mut edges = 0;
    for line in text.lines() {
        if line.contains("->") {
            edges += 1;
            let parts = quoted_parts(line);
            assert!(parts.len() >= 2, "malformed edge line: {}", line);
            assert!(declared.contains(parts[0]), "undeclared parent: {}", line);
            assert!(declared.contains(parts[1]), "undeclared child: {}", line);
            assert_ne!(parts[0], parts[1], "self loop: {}", line);
        }
    }
    assert!(edges > 0);
}

#[test]
fn edges_carry_structural_roles() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = generate("x = 1 + 2\nif x:\n    pass\n", dir.path());
    assert!(text.contains("label=\"left\""));
    assert!(text.contains("label=\"right\""));
    assert!(text.contains("label=\"condition\""));
    assert!(text.contains("label=\"then_block\""));
    assert!(text.contains("label=\"stmt[0]\""));
}

#[test]
fn elif_clauses_get_conceptual_nodes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = "\
if a:
    pass
elif b:
    pass
elif c:
    pass
";
    let text = generate(source, dir.path());
    assert!(text.contains("label=\"elif[0]"));
    assert!(text.contains("label=\"elif[1]"));
}

#[test]
fn dict_pairs_get_conceptual_nodes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = generate("d = {1: 2, 3: 4}\n", dir.path());
    assert!(text.contains("label=\"pair[0]"));
    assert!(text.contains("label=\"pair[1]"));
    assert!(text.contains("label=\"key\""));
    assert!(text.contains("label=\"value\""));
}

#[test]
fn labels_include_node_names_and_lines() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = generate("total = 5\n", dir.path());
    assert!(text.contains("Assign"));
    assert!(text.contains("Name 'total'"));
    assert!(text.contains("NumberLiteral 5"));
    assert!(text.contains("line 1"));
}

#[test]
fn string_literals_are_escaped_in_labels() {
    let dir = tempfile::tempdir().expect("temp dir");
    let text = generate("s = \"quoted\"\n", dir.path());
    // the lexeme keeps its quotes; they must be escaped in the label
    assert!(text.contains("StringLiteral \\\"quoted\\\""));
}

#[test]
fn default_artifact_name_is_ast_dot() {
    let parser = Parser::new(Lexer::new("x = 1"));
    assert_eq!(parser.dot_file_path(), Path::new("AST.dot"));
}

#[test]
fn unwritable_path_is_nonfatal_and_leaves_no_artifact() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dot = dir.path().join("missing_subdir").join("out.dot");
    let mut parser = Parser::with_dot_path(Lexer::new("x = 1"), &dot);
    let ast = parser.parse();
    assert!(matches!(ast, pyrite::core::ast::AstNode::Program { .. }));
    assert!(parser.errors().is_empty());
    assert!(!dot.exists());
}
