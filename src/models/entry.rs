// file: src/models/entry.rs
// description: code unit paired with its generated documentation
// reference: internal data structures

use crate::models::CodeUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationEntry {
    pub unit: CodeUnit,
    pub documentation: String,
    /// Plain-language explanation, only produced in non-technical mode.
    pub plain_language: Option<String>,
}

impl DocumentationEntry {
    pub fn new(unit: CodeUnit, documentation: String) -> Self {
        Self {
            unit,
            documentation,
            plain_language: None,
        }
    }

    pub fn with_plain_language(mut self, text: String) -> Self {
        self.plain_language = Some(text);
        self
    }

    pub fn name(&self) -> &str {
        &self.unit.name
    }
}
