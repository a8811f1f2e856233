// src/core/defs.rs

use indexmap::IndexMap;
use scraper::{ElementRef, Node};

use crate::core::html::normalize_ws;

/// Parse one of the portal's homemade definition lists.
///
/// Page templates render "label: value" runs as a bold label followed by
/// inline text, with <br> between entries instead of any real <dl>
/// structure. Walk the container's children in order: a <b> starts a new
/// entry, everything up to the next <b> or the end of the container is
/// its value, nested inline tags flattened to text.
///
/// Keys are lower-cased and trimmed. A colon inside the bold run stays
/// part of the key; a colon right after it is a separator and dropped.
/// A label with no value text yields no entry. A repeated label keeps
/// the latest value, in first-appearance order.
pub fn parse_defs(container: ElementRef<'_>) -> IndexMap<String, String> {
    let mut defs = IndexMap::new();
    let mut key: Option<String> = None;
    let mut value = String::new();

    for node in container.children() {
        match node.value() {
            Node::Element(el) if el.name() == "b" => {
                commit(&mut defs, key.take(), &value);
                value.clear();
                let label = ElementRef::wrap(node)
                    .map(|el| el.text().collect::<String>())
                    .unwrap_or_default();
                key = Some(normalize_ws(&label).to_lowercase());
            }
            Node::Element(_) => {
                if key.is_some() {
                    if let Some(el) = ElementRef::wrap(node) {
                        value.push(' ');
                        value.push_str(&el.text().collect::<String>());
                    }
                }
            }
            Node::Text(text) => {
                if key.is_some() {
                    value.push_str(text);
                }
            }
            _ => {}
        }
    }
    commit(&mut defs, key, &value);
    defs
}

fn commit(defs: &mut IndexMap<String, String>, key: Option<String>, raw: &str) {
    let Some(key) = key else { return };
    if key.is_empty() {
        return;
    }
    let mut value = normalize_ws(raw);
    if let Some(rest) = value.strip_prefix(':') {
        value = s!(rest.trim_start());
    }
    if value.is_empty() {
        return;
    }
    defs.insert(key, value);
}
