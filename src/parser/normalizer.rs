// file: src/parser/normalizer.rs
// description: cleanup of model output before it is rendered or written
// reference: markdown fenced code blocks, html character references

use crate::parser::patterns::ENCLOSING_FENCE;

pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Documentation text: trimmed, entities unescaped, and a fence wrapping
    /// the whole response removed whatever its language tag.
    pub fn normalize_documentation(&self, text: &str) -> String {
        let unescaped = self.unescape_entities(text.trim());
        match ENCLOSING_FENCE.captures(&unescaped) {
            Some(captures) => captures
                .get(2)
                .map(|body| body.as_str().trim().to_string())
                .unwrap_or_default(),
            None => unescaped,
        }
    }

    /// Test code: only a python or untagged enclosing fence is removed so a
    /// fenced non-python snippet stays visible in the output.
    pub fn normalize_code(&self, text: &str) -> String {
        let unescaped = self.unescape_entities(text.trim());
        if let Some(captures) = ENCLOSING_FENCE.captures(&unescaped) {
            let lang = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            if lang.is_empty() || lang.eq_ignore_ascii_case("python") || lang.eq_ignore_ascii_case("py") {
                return captures
                    .get(2)
                    .map(|body| body.as_str().trim_end().to_string())
                    .unwrap_or_default();
            }
        }
        unescaped
    }

    fn unescape_entities(&self, text: &str) -> String {
        if !text.contains('&') {
            return text.to_string();
        }

        // &amp; last so "&amp;lt;" stays "&lt;"
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&#x27;", "'")
            .replace("&amp;", "&")
    }
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
