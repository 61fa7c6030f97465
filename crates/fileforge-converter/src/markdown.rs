//! Minimal Markdown → HTML.
//!
//! A single non-recursive pass of line and inline substitutions: headings
//! 1-3, bold, italic, inline code, `- ` list items, blank-line paragraph
//! breaks and paragraph wrapping. Nested or overlapping markup is not
//! handled, and text is not HTML-escaped.

use std::sync::LazyLock;

use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        // Patterns are literals below; a bad one is a programming error caught by tests.
        pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid markdown rule {pattern}: {e}")),
        replacement,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?m)^# (.+)$", "<h1>$1</h1>"),
        rule(r"(?m)^## (.+)$", "<h2>$1</h2>"),
        rule(r"(?m)^### (.+)$", "<h3>$1</h3>"),
        rule(r"\*\*(.+?)\*\*", "<strong>$1</strong>"),
        rule(r"\*(.+?)\*", "<em>$1</em>"),
        rule(r"`(.+?)`", "<code>$1</code>"),
        rule(r"(?m)^- (.+)$", "<li>$1</li>"),
    ]
});

const HTML_HEAD: &str = concat!(
    "<!DOCTYPE html>\n",
    "<html lang=\"en\">\n",
    "<head><meta charset=\"UTF-8\"><title>Converted</title>\n",
    "<style>body{font-family:Arial,sans-serif;max-width:800px;margin:40px auto;padding:20px;line-height:1.6}\n",
    "h1,h2,h3{color:#333}code{background:#f4f4f4;padding:2px 6px;border-radius:3px}</style>\n",
    "</head><body>"
);

/// Convert Markdown text to an HTML fragment.
pub fn render_fragment(markdown: &str) -> String {
    let mut html = markdown.to_string();
    for rule in RULES.iter() {
        html = rule
            .pattern
            .replace_all(&html, rule.replacement)
            .into_owned();
    }
    html = html.replace("\n\n", "</p><p>");

    html.split('\n')
        .map(|line| {
            if line.is_empty() || starts_with_block_tag(line) {
                line.to_string()
            } else {
                format!("<p>{line}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert Markdown text to a standalone HTML document.
pub fn render_document(markdown: &str) -> String {
    format!("{HTML_HEAD}{}</body></html>", render_fragment(markdown))
}

fn starts_with_block_tag(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'<' && matches!(bytes[1], b'h' | b'l' | b'p' | b'|')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(render_fragment("# Title"), "<h1>Title</h1>");
        assert_eq!(render_fragment("## Sub"), "<h2>Sub</h2>");
        assert_eq!(render_fragment("### Minor"), "<h3>Minor</h3>");
        // Only three levels.
        assert_eq!(render_fragment("#### Deep"), "<p>#### Deep</p>");
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_fragment("some **bold** and *italic* with `code`"),
            "<p>some <strong>bold</strong> and <em>italic</em> with <code>code</code></p>"
        );
    }

    #[test]
    fn test_list_items_are_not_wrapped() {
        assert_eq!(render_fragment("- one\n- two"), "<li>one</li>\n<li>two</li>");
    }

    #[test]
    fn test_blank_line_splits_paragraphs() {
        assert_eq!(render_fragment("first\n\nsecond"), "<p>first</p><p>second</p>");
    }

    #[test]
    fn test_nested_markup_is_out_of_contract() {
        // Bold inside italic is not parsed recursively; the output is
        // whatever the fixed pass yields, but it must not panic.
        let html = render_fragment("*a **b** c*");
        assert!(html.starts_with("<p>"));
    }

    #[test]
    fn test_document_wrapper() {
        let doc = render_document("# Hi");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<h1>Hi</h1>"));
        assert!(doc.ends_with("</body></html>"));
    }
}
