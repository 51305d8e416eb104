//! Owned snapshots of DOM elements.
//!
//! `scraper::Html` is not `Send`, so documents are parsed inside synchronous
//! helpers and only owned [`Element`] values cross `.await` points.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};

use crate::common::error::{Result, ScraperError};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

// Elements that start a new rendered line
const LINE_BREAKING: &[&str] = &[
    "address", "article", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "li", "ol", "p", "section", "table", "tr", "ul",
];

const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template"];

/// A detached copy of one matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    html: String,
    attrs: HashMap<String, String>,
    text: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
            attrs: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: inner_text(element),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Rendered text, one line per block element
    pub fn inner_text(&self) -> &str {
        &self.text
    }

    /// First descendant matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let found = fragment.select(&selector).next().map(Element::from_ref);
        Ok(found)
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_string(),
        message: format!("{e:?}"),
    })
}

/// All elements in `document` matching `selector`, in document order
pub fn select_all(document: &str, selector: &str) -> Result<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    let elements = html.select(&selector).map(Element::from_ref).collect();
    Ok(elements)
}

pub fn has_match(document: &str, selector: &str) -> Result<bool> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    let found = html.select(&selector).next().is_some();
    Ok(found)
}

/// Approximates a browser's `innerText`: whitespace collapsed inside text
/// runs, block-level elements on their own lines, empty lines dropped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&WHITESPACE.replace_all(text, " ")),
            Node::Element(el) => {
                let name = el.name();
                if NON_RENDERED.contains(&name) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let breaks = LINE_BREAKING.contains(&name);
                if breaks {
                    out.push('\n');
                }
                collect_text(child_ref, out);
                if breaks {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Resolves `href` against the page it was found on. Only http(s) targets
/// are accepted.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = Url::parse(base).ok()?.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
