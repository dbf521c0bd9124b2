// file: src/parser/python.rs
// description: tree-sitter based extraction of modules, classes, functions and methods
// reference: https://github.com/tree-sitter/tree-sitter-python

use crate::error::{PipelineError, Result};
use crate::models::{CodeUnit, LineRange, UnitKind};
use crate::parser::docstring;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Where a definition sits, which decides its kind and qualified prefix.
#[derive(Clone)]
enum Scope {
    Module,
    Class(String),
    Function(String),
}

struct SourceFile<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    path: &'a Path,
    relative_path: &'a str,
    module_path: String,
}

pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| PipelineError::Config(format!("Failed to load python grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Extracts every documentable unit from one file, in source order.
    pub fn extract(&mut self, text: &str, path: &Path, relative_path: &str) -> Result<Vec<CodeUnit>> {
        let tree = self.parser.parse(text, None).ok_or_else(|| PipelineError::Parse {
            file: relative_path.to_string(),
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(PipelineError::Parse {
                file: relative_path.to_string(),
                message: describe_error(root),
            });
        }

        let file = SourceFile {
            text,
            lines: text.lines().collect(),
            path,
            relative_path,
            module_path: module_path(relative_path),
        };

        let mut units = Vec::new();

        if let Some(doc) = block_docstring(root, text) {
            units.push(CodeUnit {
                kind: UnitKind::Module,
                name: file.module_path.clone(),
                qualified_name: file.module_path.clone(),
                signature: format!("module {}", file.module_path),
                docstring: Some(doc),
                source: text.to_string(),
                file_path: path.to_path_buf(),
                relative_path: relative_path.to_string(),
                module_path: file.module_path.clone(),
                lines: LineRange::new(1, file.lines.len().max(1)),
                parent: None,
                decorators: vec![],
            });
        }

        visit_block(&file, root, &Scope::Module, &mut units);

        debug!("Extracted {} units from {}", units.len(), relative_path);
        Ok(units)
    }
}

fn visit_block(file: &SourceFile<'_>, block: Node<'_>, scope: &Scope, units: &mut Vec<CodeUnit>) {
    let mut cursor = block.walk();
    for child in block.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" | "class_definition" => {
                visit_definition(file, child, child, vec![], scope, units);
            }
            "decorated_definition" => {
                let Some(definition) = child.child_by_field_name("definition") else {
                    continue;
                };
                let mut inner = child.walk();
                let decorators = child
                    .named_children(&mut inner)
                    .filter(|n| n.kind() == "decorator")
                    .map(|n| node_text(n, file.text).trim().to_string())
                    .collect();
                visit_definition(file, definition, child, decorators, scope, units);
            }
            _ => {}
        }
    }
}

/// `span` is the decorated wrapper when present so the unit starts at the
/// first decorator.
fn visit_definition(
    file: &SourceFile<'_>,
    definition: Node<'_>,
    span: Node<'_>,
    decorators: Vec<String>,
    scope: &Scope,
    units: &mut Vec<CodeUnit>,
) {
    let Some(name_node) = definition.child_by_field_name("name") else {
        return;
    };
    let Some(body) = definition.child_by_field_name("body") else {
        return;
    };

    let name = node_text(name_node, file.text).to_string();
    let is_class = definition.kind() == "class_definition";

    let (kind, prefix, parent) = match scope {
        Scope::Module => (
            if is_class { UnitKind::Class } else { UnitKind::Function },
            file.module_path.as_str(),
            None,
        ),
        Scope::Class(owner) => (
            if is_class { UnitKind::Class } else { UnitKind::Method },
            owner.as_str(),
            Some(owner.clone()),
        ),
        Scope::Function(owner) => (
            if is_class { UnitKind::Class } else { UnitKind::Function },
            owner.as_str(),
            Some(owner.clone()),
        ),
    };

    let qualified_name = if prefix.is_empty() {
        name.clone()
    } else {
        format!("{}.{}", prefix, name)
    };

    let lines = node_lines(span);

    units.push(CodeUnit {
        kind,
        name,
        qualified_name: qualified_name.clone(),
        signature: signature(file.text, definition, body),
        docstring: block_docstring(body, file.text),
        source: excerpt(&file.lines, lines),
        file_path: file.path.to_path_buf(),
        relative_path: file.relative_path.to_string(),
        module_path: file.module_path.clone(),
        lines,
        parent,
        decorators,
    });

    let inner_scope = if is_class {
        Scope::Class(qualified_name)
    } else {
        Scope::Function(qualified_name)
    };
    visit_block(file, body, &inner_scope, units);
}

/// Header text from `def`/`class` up to the body, whitespace collapsed and
/// the trailing colon dropped.
fn signature(text: &str, definition: Node<'_>, body: Node<'_>) -> String {
    let header = text
        .get(definition.start_byte()..body.start_byte())
        .unwrap_or_default();
    let collapsed = header.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(':').trim_end().to_string()
}

fn block_docstring(block: Node<'_>, text: &str) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;

    if first.kind() != "expression_statement" {
        return None;
    }

    let mut inner = first.walk();
    let literal = first
        .named_children(&mut inner)
        .next()
        .filter(|n| n.kind() == "string")?;
    let value = docstring::literal_value(node_text(literal, text))?;
    let cleaned = docstring::clean(&value);

    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// A node ending at column 0 stops before that row's first byte.
fn node_lines(node: Node<'_>) -> LineRange {
    let start = node.start_position();
    let end = node.end_position();
    let last_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    LineRange::new(start.row + 1, last_row + 1)
}

fn excerpt(lines: &[&str], range: LineRange) -> String {
    lines
        .iter()
        .skip(range.start - 1)
        .take(range.line_count())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

fn node_text<'a>(node: Node<'_>, text: &'a str) -> &'a str {
    text.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

fn describe_error(root: Node<'_>) -> String {
    match first_error(root) {
        Some(node) => {
            let pos = node.start_position();
            if node.is_missing() {
                format!("missing {} at line {}, column {}", node.kind(), pos.row + 1, pos.column + 1)
            } else {
                format!("invalid syntax at line {}, column {}", pos.row + 1, pos.column + 1)
            }
        }
        None => "invalid syntax".to_string(),
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Dotted import path for a file relative to the scanned root.
pub fn module_path(relative_path: &str) -> String {
    let without_ext = match relative_path.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => relative_path,
    };
    let dotted = without_ext.replace('/', ".");

    match dotted.strip_suffix(".__init__") {
        Some(package) => package.to_string(),
        None => dotted,
    }
}
