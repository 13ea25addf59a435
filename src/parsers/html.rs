use crate::filter::KeywordSet;
use crate::parsers::ParseResult;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));
static MAIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main").expect("valid main selector"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li[class], td[class], div[class], p[class]")
        .expect("valid container selector")
});

/// Elements whose text is never page content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// An anchor with its raw href and visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Parses HTML content to extract its main text
pub fn parse(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);
    ParseResult::new(main_text_of(&doc))
}

/// Main content text: the `<main>` element if the page has one, otherwise the whole body
pub fn main_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    main_text_of(&doc)
}

fn main_text_of(doc: &Html) -> String {
    if let Some(main) = doc.select(&MAIN_SELECTOR).next() {
        return element_text(main);
    }
    match doc.select(&BODY_SELECTOR).next() {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

/// Visible text of an element, whitespace-collapsed
fn element_text(element: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            pieces.push(&**text);
        }
    }
    pieces
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every anchor carrying an href, in document order
pub fn anchors(html: &str) -> Vec<Anchor> {
    let doc = Html::parse_document(html);
    doc.select(&ANCHOR_SELECTOR)
        .filter_map(to_anchor)
        .collect()
}

/// Anchors nested in list items, table cells, divs or paragraphs whose class attribute
/// contains one of `class_keywords`
pub fn container_anchors(html: &str, class_keywords: &KeywordSet) -> Vec<Anchor> {
    let doc = Html::parse_document(html);
    let mut found = Vec::new();

    for container in doc.select(&CONTAINER_SELECTOR) {
        let class = container.value().attr("class").unwrap_or_default();
        if !class_keywords.matches(class) {
            continue;
        }
        found.extend(container.select(&ANCHOR_SELECTOR).filter_map(to_anchor));
    }

    ::log::trace!("Found {} anchors inside matching containers", found.len());
    found
}

fn to_anchor(element: ElementRef<'_>) -> Option<Anchor> {
    let href = element.value().attr("href")?;
    Some(Anchor {
        href: href.to_string(),
        text: element_text(element),
    })
}
