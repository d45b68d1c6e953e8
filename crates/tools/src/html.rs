//! HTML to plain text extraction.
//!
//! A small tag-level pass, not a real HTML parser: drops the contents of
//! non-content elements (script, style, nav, footer, aside), turns block
//! boundaries into line breaks, decodes the common entities, and collapses
//! the whitespace the markup leaves behind.

/// Elements whose entire contents are dropped.
const SKIP_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "aside"];

/// Elements that imply a line break around their text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "header", "h1",
    "h2", "h3", "h4", "h5", "h6",
];

/// Extract readable text from an HTML document.
pub fn extract_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut chars = html.char_indices().peekable();
    let mut skip_until: Option<String> = None;

    while let Some((i, c)) = chars.next() {
        if c != '<' {
            if skip_until.is_none() {
                out.push(c);
            }
            continue;
        }

        // Read the tag up to '>'
        let rest = &html[i + 1..];
        let end = match rest.find('>') {
            Some(pos) => pos,
            None => break, // unterminated tag, stop here
        };
        let tag_body = &rest[..end];
        // Advance the iterator past the tag (the '>' sits at i + 1 + end)
        while let Some((j, _)) = chars.peek() {
            if *j > i + 1 + end {
                break;
            }
            chars.next();
        }

        let closing = tag_body.starts_with('/');
        let name: String = tag_body
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if let Some(waiting_for) = &skip_until {
            if closing && name == *waiting_for {
                skip_until = None;
            }
            continue;
        }

        if !closing && SKIP_ELEMENTS.contains(&name.as_str()) && !tag_body.ends_with('/') {
            skip_until = Some(name);
            continue;
        }

        if BLOCK_ELEMENTS.contains(&name.as_str()) {
            out.push('\n');
        }
    }

    collapse_whitespace(&decode_entities(&out))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Trim each line and drop runs of blank lines.
fn collapse_whitespace(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines.join("\n")
}
