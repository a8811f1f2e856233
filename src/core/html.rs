// src/core/html.rs

use scraper::{ElementRef, Selector};

/// Build a selector from a literal. Selectors in this crate are fixed
/// parsing recipes for one portal; a malformed one is a programming
/// error, not an input error.
pub fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// First match under `el`, if any.
pub fn first<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    el.select(&sel(css)).next()
}

/// Flattened text content of an element, whitespace collapsed.
pub fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
