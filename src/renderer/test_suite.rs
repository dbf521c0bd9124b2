// file: src/renderer/test_suite.rs
// description: assembly of generated test code into pytest or unittest modules
// reference: https://docs.pytest.org/en/stable/explanation/goodpractices.html

use crate::config::TestFramework;
use crate::models::CodeUnit;
use crate::repository::WebFramework;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const TEST_FILE_HEADER: &str = "\"\"\"Generated test cases.\"\"\"";

/// Generated test code for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTests {
    pub unit: CodeUnit,
    pub code: String,
}

/// All generated tests for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTests {
    pub relative_path: String,
    pub module_path: String,
    pub web: Option<WebFramework>,
    pub units: Vec<UnitTests>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    /// Path under the tests output directory, mirroring the source layout.
    pub relative_path: PathBuf,
    pub body: String,
}

pub struct TestSuiteRenderer {
    framework: TestFramework,
}

impl TestSuiteRenderer {
    pub fn new(framework: TestFramework) -> Self {
        Self { framework }
    }

    /// `pkg/calc.py` becomes `pkg/calc_test.py` for pytest and
    /// `pkg/test_calc.py` for unittest.
    pub fn test_path(&self, relative_path: &str) -> PathBuf {
        let (dir, file) = match relative_path.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, relative_path),
        };
        let stem = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);

        let name = match self.framework {
            TestFramework::Pytest => format!("{}_test.py", stem),
            TestFramework::Unittest => format!("test_{}.py", stem),
        };

        match dir {
            Some(dir) => dir.split('/').collect::<PathBuf>().join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn render(&self, source: &SourceTests) -> Option<TestFile> {
        if source.units.is_empty() {
            return None;
        }

        let mut body = String::new();
        body.push_str(TEST_FILE_HEADER);
        body.push_str("\n\n");

        for import in self.imports(source) {
            body.push_str(&import);
            body.push('\n');
        }

        for unit_tests in &source.units {
            body.push_str(&format!(
                "\n\n# Test cases for {}\n{}\n",
                unit_tests.unit.name,
                unit_tests.code.trim_end()
            ));
        }

        if self.framework == TestFramework::Unittest {
            body.push_str("\n\nif __name__ == \"__main__\":\n    unittest.main()\n");
        }

        Some(TestFile {
            relative_path: self.test_path(&source.relative_path),
            body,
        })
    }

    fn imports(&self, source: &SourceTests) -> BTreeSet<String> {
        let mut imports: BTreeSet<String> = [
            format!("import {}", self.framework.as_str()),
            "import os".to_string(),
            "import sys".to_string(),
            "from unittest.mock import patch, MagicMock".to_string(),
            format!("from {} import *", source.module_path),
        ]
        .into_iter()
        .collect();

        if let Some(web) = source.web {
            imports.extend(web.test_imports().iter().map(|s| s.to_string()));
        }

        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;
    use crate::models::code_unit::sample_unit;
    use pretty_assertions::assert_eq;

    fn source(web: Option<WebFramework>) -> SourceTests {
        SourceTests {
            relative_path: "pkg/calc.py".to_string(),
            module_path: "pkg.calc".to_string(),
            web,
            units: vec![UnitTests {
                unit: sample_unit(UnitKind::Function, "add", "pkg/calc.py", 1),
                code: "def test_add():\n    assert add(1, 2) == 3\n".to_string(),
            }],
        }
    }

    #[test]
    fn test_paths_per_framework() {
        let pytest = TestSuiteRenderer::new(TestFramework::Pytest);
        let unittest = TestSuiteRenderer::new(TestFramework::Unittest);

        assert_eq!(pytest.test_path("pkg/calc.py"), PathBuf::from("pkg/calc_test.py"));
        assert_eq!(unittest.test_path("pkg/calc.py"), PathBuf::from("pkg/test_calc.py"));
        assert_eq!(unittest.test_path("main.py"), PathBuf::from("test_main.py"));
    }

    #[test]
    fn test_pytest_file_body() {
        let file = TestSuiteRenderer::new(TestFramework::Pytest)
            .render(&source(None))
            .unwrap();

        assert_eq!(
            file.body,
            "\"\"\"Generated test cases.\"\"\"\n\n\
             from pkg.calc import *\n\
             from unittest.mock import patch, MagicMock\n\
             import os\n\
             import pytest\n\
             import sys\n\
             \n\n# Test cases for add\n\
             def test_add():\n    assert add(1, 2) == 3\n"
        );
    }

    #[test]
    fn test_unittest_file_has_main_guard_and_flask_imports() {
        let file = TestSuiteRenderer::new(TestFramework::Unittest)
            .render(&source(Some(WebFramework::Flask)))
            .unwrap();

        assert!(file.body.contains("import unittest\n"));
        assert!(file.body.contains("from flask.testing import FlaskClient\n"));
        assert!(file.body.ends_with("if __name__ == \"__main__\":\n    unittest.main()\n"));
    }

    #[test]
    fn test_no_units_no_file() {
        let mut empty = source(None);
        empty.units.clear();
        assert!(TestSuiteRenderer::new(TestFramework::Pytest).render(&empty).is_none());
    }
}
