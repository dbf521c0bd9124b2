// file: src/ai/prompts.rs
// description: prompt templates for documentation, plain-language summaries and tests
// reference: https://ai.google.dev/gemini-api/docs/prompting-strategies

use crate::config::TestFramework;
use crate::models::{CodeUnit, UnitKind};
use crate::repository::{RouteInfo, WebFramework};
use crate::utils::template::PromptTemplate;

pub const FUNCTION_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert programmer documenting Python code. Write markdown documentation for the function below covering:
1. What the function does
2. Parameters and their types
3. Return value and type
4. Exceptions that might be raised
5. Example usage

Incorporate the existing docstring where it is accurate.

SIGNATURE: {signature}
DOCSTRING: {docstring}

FUNCTION CODE:
```python
{source}
```

RESPONSE FORMAT:
### `{name}`

[What the function does]

**Parameters**
- `param` (type): Description

**Returns**
(type): Description

**Raises**
- `ExceptionType`: When it is raised

**Example**
```python
# usage
```

RESPONSE:
"#,
);

pub const CLASS_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert programmer documenting Python code. Write markdown documentation for the class below covering:
1. What the class represents and its purpose
2. Constructor parameters and their types
3. Key methods and what they do
4. Attributes and their types
5. Example usage

Incorporate the existing docstring where it is accurate.

SIGNATURE: {signature}
DOCSTRING: {docstring}

CLASS CODE:
```python
{source}
```

RESPONSE FORMAT:
### `{name}`

[What the class represents]

**Constructor**
- `param` (type): Description

**Attributes**
- `attribute` (type): Description

**Methods**
- `method(args)`: Description

**Example**
```python
# usage
```

RESPONSE:
"#,
);

pub const MODULE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert programmer documenting Python code. Write markdown documentation for the module below covering:
1. The module's purpose and what it provides
2. Key functions and classes it exposes
3. How it fits into the broader project
4. Example usage of its key components

MODULE NAME: {name}
MODULE DOCSTRING: {docstring}

MODULE CODE:
```python
{source}
```

RESPONSE FORMAT:
### Module `{name}`

[Purpose of the module]

**Overview**
[What the module provides]

**Components**
- [Key functions and classes]

**Example Usage**
```python
# usage
```

RESPONSE:
"#,
);

pub const PLAIN_LANGUAGE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"Explain what the following piece of software does for someone who does not write code. Use two or three short paragraphs of plain English. Do not include code, jargon, headings or markdown formatting.

NAME: {name}
DESCRIPTION: {docstring}

CODE:
```python
{source}
```

EXPLANATION:
"#,
);

pub const TEST_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert Python test developer. Given the following Python code, generate comprehensive test cases using {framework}.
The test cases should cover:
1. Expected behavior
2. Edge cases
3. Error cases and input validation

If the code defines HTTP endpoints:
- Use the framework's test client to simulate requests
- Test the supported HTTP methods and rejection of unsupported ones
- Assert status codes, content types and response bodies
- Enable the framework's testing mode

If the code defines functions or classes:
- Test all public behavior
- Check handling of invalid or missing inputs
- Assert raised exceptions
- Assert return types and values

Return only valid, executable Python test code structured using {framework} conventions. Use fixtures or setUp methods for shared setup.

CODE:
```python
{source}
```

Generate test cases for the function or class named: {name}

RESPONSE:
"#,
);

/// Documentation prompt matching the unit's kind.
pub fn documentation_prompt(unit: &CodeUnit) -> String {
    let template = match unit.kind {
        UnitKind::Module => &MODULE_TEMPLATE,
        UnitKind::Class => &CLASS_TEMPLATE,
        UnitKind::Function | UnitKind::Method => &FUNCTION_TEMPLATE,
    };
    template.render(&unit_values(unit))
}

pub fn plain_language_prompt(unit: &CodeUnit) -> String {
    PLAIN_LANGUAGE_TEMPLATE.render(&unit_values(unit))
}

pub fn test_prompt(
    unit: &CodeUnit,
    framework: TestFramework,
    web: Option<WebFramework>,
    route: Option<&RouteInfo>,
) -> String {
    let mut values = unit_values(unit);
    values.push(("framework", framework.as_str()));
    let mut prompt = TEST_TEMPLATE.render(&values);

    if let Some(web) = web {
        prompt.push_str(&format!("\nThe code uses {}.", web));
    }
    if let Some(route) = route {
        prompt.push_str(&format!(
            "\n`{}` handles {} requests to `{}`.",
            unit.name, route.method, route.path
        ));
    }

    prompt
}

fn unit_values(unit: &CodeUnit) -> Vec<(&'static str, &str)> {
    vec![
        ("name", unit.name.as_str()),
        ("source", unit.source.as_str()),
        ("docstring", unit.docstring_or_default()),
        ("signature", unit.signature.as_str()),
    ]
}
