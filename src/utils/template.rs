// file: src/utils/template.rs
// description: single-pass placeholder substitution for prompt templates
// reference: Internal code standards

use std::collections::BTreeSet;

pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Replaces every `{key}` with its value in one pass. Substituted text is
    /// never rescanned, so braces inside source code survive untouched.
    /// Unknown placeholders are left as written.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let replaced = after.find('}').and_then(|close| {
                let key = &after[..close];
                values
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| (close, *value))
            });

            match replaced {
                Some((close, value)) => {
                    result.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    result.push('{');
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Names of the `{identifier}` placeholders the template uses.
    pub fn placeholders(&self) -> BTreeSet<&'static str> {
        let mut found = BTreeSet::new();
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            if let Some(close) = after.find('}')
                && !after[..close].is_empty()
                && after[..close].chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                found.insert(&after[..close]);
            }
            rest = after;
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_replaces_known_keys() {
        let template = PromptTemplate::new("Document `{name}`:\n{source}\n");
        let result = template.render(&[("name", "add"), ("source", "def add(a, b): ...")]);

        assert_eq!(result, "Document `add`:\ndef add(a, b): ...\n");
    }

    #[test]
    fn test_substituted_values_not_rescanned() {
        let template = PromptTemplate::new("{source} / {name}");
        let result = template.render(&[("source", "f\"{name}\" and {x: 1}"), ("name", "fmt")]);

        assert_eq!(result, "f\"{name}\" and {x: 1} / fmt");
    }

    #[test]
    fn test_unknown_placeholders_kept() {
        let template = PromptTemplate::new("{known} {unknown} {");
        assert_eq!(template.render(&[("known", "yes")]), "yes {unknown} {");
    }

    #[test]
    fn test_placeholders() {
        let template = PromptTemplate::new("{name} uses {framework} with {name} and {not valid}");
        let keys: Vec<_> = template.placeholders().into_iter().collect();
        assert_eq!(keys, vec!["framework", "name"]);
    }
}
