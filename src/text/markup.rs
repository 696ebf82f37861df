//! Visible text extraction from HTML
//!
//! Content of metadata, scripts, styles, forms, hidden elements and the
//! document title never reaches the index.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose whole subtree is dropped before text extraction
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "meta", "script", "style", "form", "title", "noscript", "template", "img", "svg",
    "iframe", "object",
];

fn is_skipped(element: &ElementRef) -> bool {
    let value = element.value();
    if SKIPPED_ELEMENTS.contains(&value.name()) {
        return true;
    }
    if value.attr("hidden").is_some() {
        return true;
    }
    if value.attr("aria-hidden") == Some("true") {
        return true;
    }
    value.name() == "input" && value.attr("type") == Some("hidden")
}

/// Returns the visible text of an HTML document as one whitespace-separated string
///
/// # Example
///
/// ```
/// use lexicrawl::text::visible_text;
///
/// let html = "<html><head><title>T</title></head><body><p>Hello</p><script>x()</script></body></html>";
/// assert_eq!(visible_text(html), "Hello");
/// ```
pub fn visible_text(html: &str) -> String {
    text_blocks(html).join(" ")
}

/// Returns the own text of every visible element, nested elements before their parent
///
/// Each block is the concatenation of the element's direct text children,
/// trimmed; empty blocks are skipped. Snippets are cut from these blocks.
pub fn text_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    collect_blocks(document.root_element(), &mut blocks);
    blocks
}

fn collect_blocks(element: ElementRef, blocks: &mut Vec<String>) {
    if is_skipped(&element) {
        return;
    }

    let mut own = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let piece = text.trim();
                if !piece.is_empty() {
                    if !own.is_empty() {
                        own.push(' ');
                    }
                    own.push_str(piece);
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_blocks(child_element, blocks);
                }
            }
            _ => {}
        }
    }

    if !own.is_empty() {
        blocks.push(own);
    }
}

/// Extracts the document title
pub fn title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
