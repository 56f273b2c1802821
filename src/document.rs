//! Traversal capabilities the parsers rely on.
//!
//! The listing and election parsers only need a handful of operations on a
//! parsed page, so they are written against [`Node`] rather than a concrete
//! HTML library. [`scraper::ElementRef`] is the production implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub trait Node: Sized {
    /// First descendant matching the CSS selector.
    fn find(&self, selector: &str) -> Option<Self>;
    /// All descendants matching the CSS selector, in document order.
    fn find_all(&self, selector: &str) -> Vec<Self>;
    /// Nearest following sibling element with the given tag name.
    fn next_sibling(&self, tag: &str) -> Option<Self>;
    /// Concatenated text of the node and its descendants, untrimmed.
    fn text(&self) -> String;
    fn attribute(&self, name: &str) -> Option<&str>;
}

static SELECTORS: Lazy<Mutex<HashMap<String, Selector>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled(css: &str) -> Option<Selector> {
    let mut guard = SELECTORS.lock().expect("selector cache mutex poisoned");
    if let Some(selector) = guard.get(css) {
        return Some(selector.clone());
    }
    match Selector::parse(css) {
        Ok(selector) => {
            guard.insert(css.to_string(), selector.clone());
            Some(selector)
        }
        Err(err) => {
            warn!("invalid selector {css:?}: {err:?}");
            None
        }
    }
}

impl<'a> Node for ElementRef<'a> {
    fn find(&self, selector: &str) -> Option<Self> {
        let selector = compiled(selector)?;
        self.select(&selector).next()
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        let Some(selector) = compiled(selector) else {
            return Vec::new();
        };
        self.select(&selector).collect()
    }

    fn next_sibling(&self, tag: &str) -> Option<Self> {
        self.next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }
}

pub fn parse_html(body: &str) -> Html {
    Html::parse_document(body)
}
