//! Read-only document helpers on top of `scraper`.
//!
//! Selectors come from configuration, so they are compiled once and invalid
//! ones are logged and ignored rather than treated as errors.

use scraper::{ElementRef, Selector};

/// Compile a CSS selector, logging (not failing) on invalid input.
pub(crate) fn compile(source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = source, error = %e, "ignoring invalid selector");
            None
        }
    }
}

/// An ordered list of compiled selectors, most specific first.
#[derive(Debug, Clone, Default)]
pub struct SelectorList {
    entries: Vec<(String, Selector)>,
}

impl SelectorList {
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Self {
        let entries = sources
            .iter()
            .filter_map(|source| {
                let source = source.as_ref();
                compile(source).map(|selector| (source.to_string(), selector))
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.entries.iter().map(|(source, selector)| (source.as_str(), selector))
    }

    /// First descendant matched by the highest-priority selector that matches at all.
    pub fn first_match<'a>(&self, root: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.entries
            .iter()
            .find_map(|(_, selector)| root.select(selector).next())
    }

    /// Whether the element itself matches any selector.
    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        self.entries.iter().any(|(_, selector)| selector.matches(&element))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concatenated text of the element and its descendants.
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// The element followed by its element ancestors, innermost first.
pub(crate) fn self_and_ancestors<'a>(
    element: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap))
}

/// Nearest element (self included) matching the selector.
pub(crate) fn closest<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    self_and_ancestors(element).find(|e| selector.matches(e))
}

/// Substring test on the raw `class` attribute.
pub(crate) fn class_contains(element: ElementRef<'_>, fragment: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.contains(fragment))
}

/// Whether `inner` lies within the subtree rooted at `outer` (or is `outer`).
pub(crate) fn is_within(inner: ElementRef<'_>, outer: ElementRef<'_>) -> bool {
    self_and_ancestors(inner).any(|e| e.id() == outer.id())
}
