// file: src/exporter/html.rs
// description: markdown to styled standalone html for pdf converters
// reference: https://docs.rs/pulldown-cmark

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

const DEFAULT_TITLE: &str = "Documentation";

const STYLESHEET: &str = r#"body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    max-width: 900px;
    margin: 0 auto;
    padding: 20px;
}
pre {
    background-color: #f5f5f5;
    padding: 12px;
    border-radius: 5px;
    overflow-x: auto;
}
code {
    font-family: Consolas, monospace;
    font-size: 0.9em;
}
h1, h2, h3 {
    color: #333;
}
hr {
    border: 0;
    border-top: 1px solid #eee;
    margin: 20px 0;
}
table {
    border-collapse: collapse;
}
th, td {
    border: 1px solid #ddd;
    padding: 6px 10px;
}"#;

pub struct HtmlRenderer {
    options: Options,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }

    /// Complete HTML document whose `<title>` is the first level-one heading.
    pub fn render(&self, markdown: &str) -> String {
        let title = self.first_heading(markdown).unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut body, Parser::new_ext(markdown, self.options));

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_text(&title),
            STYLESHEET,
            body
        )
    }

    fn first_heading(&self, markdown: &str) -> Option<String> {
        let mut inside = false;
        let mut text = String::new();

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(Tag::Heading {
                    level: HeadingLevel::H1,
                    ..
                }) => inside = true,
                Event::End(TagEnd::Heading(HeadingLevel::H1)) if inside => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                    inside = false;
                }
                Event::Text(t) | Event::Code(t) if inside => text.push_str(&t),
                _ => {}
            }
        }

        None
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
