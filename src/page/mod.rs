//! Read-only view of a loaded web page and the scans that run against it.
//!
//! Everything in here takes a [`Page`] by shared reference and returns plain
//! data; nothing mutates the document or reaches outside of it.

pub mod analyzer;
pub mod json_ld;
pub mod microdata;

pub use analyzer::{analyze, inspect, JsonLdReport, MicrodataReport, PageInspection};

use crate::strategy::domain_of;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Invalid title selector"));

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("Invalid body selector"));

/// A parsed page together with the address it was loaded from
pub struct Page {
    pub url: String,
    pub document: Html,
    markup: String,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        let document = Html::parse_document(html);
        let markup = document.root_element().html();
        Page {
            url: url.into(),
            document,
            markup,
        }
    }

    /// Serialized markup of the root element
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Size in bytes of the serialized markup
    pub fn size(&self) -> usize {
        self.markup.len()
    }

    pub fn domain(&self) -> String {
        domain_of(&self.url)
    }

    pub fn title(&self) -> Option<String> {
        self.document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| element_text(el).trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Text content of `<body>`, empty if the page has none
    pub fn body_text(&self) -> String {
        self.document
            .select(&BODY_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_default()
    }
}

/// Concatenated text of all descendant text nodes
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect()
}

/// Length in characters, which is what the content thresholds are measured in
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
