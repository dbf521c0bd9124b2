// file: src/parser/docstring.rs
// description: python string literal unquoting and docstring indentation cleanup
// reference: https://docs.python.org/3/library/inspect.html#inspect.cleandoc

/// Returns the text of a Python string literal usable as a docstring.
/// Byte and f-string literals are not docstrings and yield `None`.
pub fn literal_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let prefix_len = raw
        .find(|c: char| c == '"' || c == '\'')
        .filter(|&idx| idx <= 3)?;
    let prefix = raw[..prefix_len].to_ascii_lowercase();

    if !prefix.chars().all(|c| c == 'r' || c == 'u') {
        return None;
    }

    let body = &raw[prefix_len..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return Some(body[quote.len()..body.len() - quote.len()].to_string());
        }
    }

    None
}

const TAB_SIZE: usize = 8;

/// Cleans up indentation the way `inspect.cleandoc` does: the first line is
/// stripped, the common leading indentation of the remaining lines removed,
/// and blank lines at both ends dropped. Indentation is counted in
/// characters after tab expansion.
pub fn clean(doc: &str) -> String {
    let lines: Vec<String> = doc.lines().map(expand_tabs).collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim().to_string());
    for line in lines.iter().skip(1) {
        cleaned.push(skip_chars(line, margin).trim_end().to_string());
    }

    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Replaces tabs with spaces up to the next multiple of eight columns.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.push_str(&" ".repeat(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn skip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}
