// file: src/renderer/document.rs
// description: grouping of documentation entries into a consolidated markdown document
// reference: https://spec.commonmark.org

use crate::config::GroupBy;
use crate::models::DocumentationEntry;
use std::collections::BTreeMap;

pub const INTRO_LINE: &str = "Generated documentation for the project.";
pub const PLAIN_TERMS_HEADING: &str = "### In plain terms";
const FLAT_SECTION: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub entries: Vec<DocumentationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

impl RenderedDocument {
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &DocumentationEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n{}\n", self.title, INTRO_LINE));

        for section in &self.sections {
            out.push_str(&format!("\n## {}\n", section.heading));

            for entry in &section.entries {
                out.push('\n');
                out.push_str(entry.documentation.trim_end());
                out.push('\n');

                if let Some(plain) = &entry.plain_language {
                    out.push_str(&format!("\n{}\n\n{}\n", PLAIN_TERMS_HEADING, plain.trim_end()));
                }

                out.push_str("\n---\n");
            }
        }

        out
    }
}

pub struct DocumentRenderer {
    group_by: GroupBy,
}

impl DocumentRenderer {
    pub fn new(group_by: GroupBy) -> Self {
        Self { group_by }
    }

    /// Groups entries into sections sorted by heading. Entries inside a
    /// section are ordered by name, then location.
    pub fn render(&self, title: &str, entries: Vec<DocumentationEntry>) -> RenderedDocument {
        let mut grouped: BTreeMap<String, Vec<DocumentationEntry>> = BTreeMap::new();

        for entry in entries {
            let heading = match self.group_by {
                GroupBy::Module => entry.unit.module_path.clone(),
                GroupBy::Type => entry.unit.kind.label().to_string(),
                GroupBy::Flat => FLAT_SECTION.to_string(),
            };
            grouped.entry(heading).or_default().push(entry);
        }

        let sections = grouped
            .into_iter()
            .map(|(heading, mut entries)| {
                entries.sort_by(|a, b| {
                    (&a.unit.name, &a.unit.relative_path, a.unit.lines.start).cmp(&(
                        &b.unit.name,
                        &b.unit.relative_path,
                        b.unit.lines.start,
                    ))
                });
                Section { heading, entries }
            })
            .collect();

        RenderedDocument {
            title: title.to_string(),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;
    use crate::models::code_unit::sample_unit;
    use pretty_assertions::assert_eq;

    fn entry(kind: UnitKind, name: &str, path: &str, line: usize) -> DocumentationEntry {
        DocumentationEntry::new(sample_unit(kind, name, path, line), format!("doc for {}", name))
    }

    fn entries() -> Vec<DocumentationEntry> {
        vec![
            entry(UnitKind::Function, "subtract", "calc.py", 5),
            entry(UnitKind::Class, "Account", "bank.py", 1),
            entry(UnitKind::Function, "add", "calc.py", 1),
            entry(UnitKind::Method, "deposit", "bank.py", 3),
        ]
    }

    fn names(doc: &RenderedDocument) -> Vec<(String, Vec<String>)> {
        doc.sections
            .iter()
            .map(|s| (s.heading.clone(), s.entries.iter().map(|e| e.name().to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_group_by_module() {
        let doc = DocumentRenderer::new(GroupBy::Module).render("API", entries());

        assert_eq!(
            names(&doc),
            vec![
                ("bank".to_string(), vec!["Account".to_string(), "deposit".to_string()]),
                ("calc".to_string(), vec!["add".to_string(), "subtract".to_string()]),
            ]
        );
    }

    #[test]
    fn test_group_by_type() {
        let doc = DocumentRenderer::new(GroupBy::Type).render("API", entries());
        let headings: Vec<_> = doc.sections.iter().map(|s| s.heading.as_str()).collect();

        assert_eq!(headings, vec!["Class", "Function", "Method"]);
    }

    #[test]
    fn test_grouping_preserves_entries() {
        let mut expected: Vec<_> = entries().into_iter().map(|e| e.documentation).collect();
        expected.sort();

        for mode in [GroupBy::Module, GroupBy::Type, GroupBy::Flat] {
            let doc = DocumentRenderer::new(mode).render("API", entries());
            let mut texts: Vec<_> = doc.entries().map(|e| e.documentation.clone()).collect();
            texts.sort();
            assert_eq!(texts, expected);
        }
    }

    #[test]
    fn test_markdown_layout() {
        let doc = DocumentRenderer::new(GroupBy::Flat).render(
            "My Docs",
            vec![entry(UnitKind::Function, "add", "calc.py", 1)],
        );

        assert_eq!(
            doc.to_markdown(),
            "# My Docs\n\nGenerated documentation for the project.\n\n## All\n\ndoc for add\n\n---\n"
        );
    }

    #[test]
    fn test_plain_language_block() {
        let with_plain = entry(UnitKind::Function, "add", "calc.py", 1)
            .with_plain_language("It adds numbers.".to_string());
        let doc = DocumentRenderer::new(GroupBy::Flat).render("Docs", vec![with_plain]);

        assert!(doc
            .to_markdown()
            .contains("doc for add\n\n### In plain terms\n\nIt adds numbers.\n\n---\n"));
    }

    #[test]
    fn test_empty_document() {
        let doc = DocumentRenderer::new(GroupBy::Module).render("Docs", vec![]);

        assert!(doc.is_empty());
        assert_eq!(doc.to_markdown(), "# Docs\n\nGenerated documentation for the project.\n");
    }
}
