// file: src/models/code_unit.rs
// description: extracted python constructs and their kinds
// reference: python language reference, compound statements

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Module,
    Class,
    Function,
    Method,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Module => "module",
            UnitKind::Class => "class",
            UnitKind::Function => "function",
            UnitKind::Method => "method",
        }
    }

    /// Section heading used when grouping by type.
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Module => "Module",
            UnitKind::Class => "Class",
            UnitKind::Function => "Function",
            UnitKind::Method => "Method",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, UnitKind::Function | UnitKind::Method)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based inclusive line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    pub kind: UnitKind,
    pub name: String,
    pub qualified_name: String,
    pub signature: String,
    pub docstring: Option<String>,
    pub source: String,
    pub file_path: PathBuf,
    pub relative_path: String,
    pub module_path: String,
    pub lines: LineRange,
    pub parent: Option<String>,
    #[serde(default)]
    pub decorators: Vec<String>,
}

impl CodeUnit {
    pub fn location(&self) -> String {
        format!("{}:{}", self.relative_path, self.lines)
    }

    pub fn docstring_or_default(&self) -> &str {
        self.docstring
            .as_deref()
            .filter(|doc| !doc.trim().is_empty())
            .unwrap_or("No docstring provided")
    }
}

#[cfg(test)]
pub(crate) fn sample_unit(kind: UnitKind, name: &str, relative_path: &str, start: usize) -> CodeUnit {
    let module_path = relative_path.trim_end_matches(".py").replace('/', ".");
    CodeUnit {
        kind,
        name: name.to_string(),
        qualified_name: format!("{}.{}", module_path, name),
        signature: format!("def {}()", name),
        docstring: None,
        source: format!("def {}():\n    pass", name),
        file_path: PathBuf::from("/project").join(relative_path),
        relative_path: relative_path.to_string(),
        module_path,
        lines: LineRange::new(start, start + 1),
        parent: None,
        decorators: vec![],
    }
}
