// file: src/parser/patterns.rs
// description: compiled regex patterns for framework detection and response cleanup
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Web framework imports
    pub static ref FLASK_IMPORT: Regex = Regex::new(
        r"(?m)^\s*(?:from\s+flask(?:\.|\s)|import\s+flask\b)"
    ).expect("FLASK_IMPORT regex is valid");

    pub static ref FASTAPI_IMPORT: Regex = Regex::new(
        r"(?m)^\s*(?:from\s+fastapi(?:\.|\s)|import\s+fastapi\b)"
    ).expect("FASTAPI_IMPORT regex is valid");

    pub static ref DJANGO_IMPORT: Regex = Regex::new(
        r"(?m)^\s*(?:from\s+django(?:\.|\s)|import\s+django\b)"
    ).expect("DJANGO_IMPORT regex is valid");

    // Route decorators: @app.route("/x"), @router.get("/x"), @bp.post('/x')
    pub static ref ROUTE_DECORATOR: Regex = Regex::new(
        r#"^@\s*[\w.]+\.(route|get|post|put|delete|patch)\s*\(\s*(?:path\s*=\s*)?['"]([^'"]*)['"]"#
    ).expect("ROUTE_DECORATOR regex is valid");

    pub static ref ROUTE_METHODS: Regex = Regex::new(
        r#"methods\s*=\s*[\[(]\s*['"](\w+)['"]"#
    ).expect("ROUTE_METHODS regex is valid");

    // A response wrapped entirely in one fenced block
    pub static ref ENCLOSING_FENCE: Regex = Regex::new(
        r"(?s)^```([\w+-]*)[ \t]*\r?\n(.*?)\r?\n?```\s*$"
    ).expect("ENCLOSING_FENCE regex is valid");
}
