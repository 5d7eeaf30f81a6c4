//! Locating and rendering an agent's visible reasoning block.

use scraper::ElementRef;

use super::config::ReasoningConfig;
use super::dom::{self, SelectorList};
use super::markdown;
use super::text::{collapse_inline, normalize_block};

/// A rendered reasoning block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reasoning {
    pub header: String,
    pub body: String,
}

impl Reasoning {
    /// Header and body joined by one blank line.
    pub fn full_text(&self) -> String {
        format!("{}\n\n{}", self.header, self.body)
    }
}

/// A reasoning block together with the nodes it came from.
#[derive(Debug, Clone)]
pub struct ReasoningBlock<'a> {
    pub container: ElementRef<'a>,
    pub header_element: Option<ElementRef<'a>>,
    pub reasoning: Reasoning,
}

/// Finds reasoning containers by signature, with a keyword scan as fallback.
#[derive(Debug, Clone)]
pub struct ReasoningExtractor {
    signatures: SelectorList,
    headers: SelectorList,
    default_header: String,
    keywords: Vec<String>,
    marker_texts: Vec<String>,
    marker_class_fragments: Vec<String>,
}

impl ReasoningExtractor {
    pub fn new(config: &ReasoningConfig) -> Self {
        Self {
            signatures: SelectorList::compile(&config.signatures),
            headers: SelectorList::compile(&config.header_selectors),
            default_header: config.default_header.clone(),
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            marker_texts: config.marker_texts.clone(),
            marker_class_fragments: config.marker_class_fragments.clone(),
        }
    }

    /// Extract the reasoning of a turn, if it has any.
    pub fn extract(&self, turn: ElementRef<'_>) -> Option<Reasoning> {
        self.locate(turn).map(|block| block.reasoning)
    }

    /// Like [`extract`](Self::extract), but also returns the container and header
    /// nodes so callers can exclude them from the primary content.
    ///
    /// A container whose rendered body is empty does not count as reasoning.
    pub fn locate<'a>(&self, turn: ElementRef<'a>) -> Option<ReasoningBlock<'a>> {
        let container = self
            .signatures
            .first_match(turn)
            .or_else(|| self.keyword_fallback(turn))?;

        let header_element = self.headers.first_match(turn);
        let header = header_element
            .map(|h| collapse_inline(&dom::text_content(h)).trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| self.default_header.clone());

        let rendered = markdown::render(container);
        let body = if rendered.lines().any(|line| line.trim() == header) {
            let kept: Vec<&str> = rendered
                .lines()
                .filter(|line| line.trim() != header)
                .collect();
            normalize_block(&kept.join("\n"))
        } else {
            rendered
        };
        if body.is_empty() {
            tracing::debug!("reasoning container has no body, ignoring");
            return None;
        }

        Some(ReasoningBlock {
            container,
            header_element,
            reasoning: Reasoning { header, body },
        })
    }

    /// Every element matched by any signature selector within the turn.
    pub(crate) fn signature_matches<'a>(&self, turn: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.signatures
            .iter()
            .flat_map(|(_, selector)| turn.select(selector))
            .collect()
    }

    /// An element mentioning a reasoning keyword whose parent carries a marker.
    fn keyword_fallback<'a>(&self, turn: ElementRef<'a>) -> Option<ElementRef<'a>> {
        turn.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| {
                let text = dom::text_content(*element).to_lowercase();
                if !self.keywords.iter().any(|k| text.contains(k.as_str())) {
                    return false;
                }
                let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
                    return false;
                };
                let parent_text = dom::text_content(parent);
                self.marker_texts.iter().any(|m| parent_text.contains(m.as_str()))
                    || self
                        .marker_class_fragments
                        .iter()
                        .any(|f| dom::class_contains(parent, f))
            })
    }
}
