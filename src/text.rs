use scraper::{ElementRef, Html};

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Visible text of an HTML document, one text node per line.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    element_text_lines(doc.root_element()).join("\n")
}

/// Text nodes under `el`, trimmed and whitespace-collapsed, skipping script/style.
pub fn element_text_lines(el: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }
        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Whitespace-collapsed text of a single element.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn looks_like_html(body: &str) -> bool {
    let head: String = body.chars().take(2048).collect::<String>().to_lowercase();
    head.contains("<html") || head.contains("<!doctype html") || head.contains("<body")
}

/// Collapse whitespace and cut to at most `max` characters.
pub fn clip(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        collapsed
    } else {
        collapsed.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_script_and_style() {
        let html = "<html><head><style>.a{}</style><script>var x = 1;</script></head>\
                    <body><h1>Our   Team</h1><p>Jane Doe</p></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "Our Team\nJane Doe");
    }

    #[test]
    fn detects_html() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(!looks_like_html("ITEM 10. DIRECTORS, EXECUTIVE OFFICERS"));
    }

    #[test]
    fn clip_counts_chars() {
        assert_eq!(clip("a  b   c", 3), "a b");
        assert_eq!(clip("short", 10), "short");
    }
}
