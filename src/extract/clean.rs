//! Page cleaning before prompting
//!
//! Rendered portal pages are mostly scripts, styles and boilerplate. Stripping them keeps
//! prompts small and focused on the content.

use crate::fetch::{ContentKind, PageContent};
use crate::url::is_social_link;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements removed together with their whole subtree
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "path", "header", "footer", "iframe", "meta",
    "button", "input",
];

/// Reduces page content to what a model needs to see
///
/// HTML loses its noise elements and social-network anchors and has its whitespace
/// collapsed. Document text (e.g. from a PDF) passes through untouched, even when it
/// happens to contain angle brackets. Both are cut to at most `max_chars` characters.
pub fn clean_for_model(page: &PageContent, max_chars: usize) -> String {
    if page.body.is_empty() {
        return String::new();
    }

    if page.kind == ContentKind::Document {
        return truncate_chars(&page.body, max_chars);
    }

    let document = Html::parse_document(&page.body);
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut markup = String::new();
    serialize_element(root, &mut markup);

    let collapsed = markup.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn serialize_element(element: ElementRef<'_>, out: &mut String) {
    let value = element.value();
    let name = value.name();

    if NOISE_TAGS.contains(&name) {
        return;
    }
    if name == "a" && value.attr("href").is_some_and(is_social_link) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for (key, attr) in value.attrs() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&attr.replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    serialize_element(child, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Cuts a string to at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
