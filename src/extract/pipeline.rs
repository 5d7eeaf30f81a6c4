//! The extraction pipeline: document in, [`TranscriptRecord`] out.

use chrono::{DateTime, SecondsFormat, Utc};
use scraper::{ElementRef, Html, Selector};

use super::classify::Classifier;
use super::config::ExtractionConfig;
use super::dom::{self, SelectorList};
use super::layout::Layout;
use super::markdown;
use super::reasoning::{ReasoningBlock, ReasoningExtractor};
use super::segment::Segmenter;
use super::text::char_len;
use crate::transcript::{TranscriptMetadata, TranscriptRecord, TurnRecord};

/// What the caller knows about the page beyond its markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSource {
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Turns a parsed chat page into a transcript.
///
/// Read-only on the document and deterministic for a given extraction instant.
#[derive(Debug)]
pub struct Extractor {
    min_content_chars: usize,
    segmenter: Segmenter,
    classifier: Classifier,
    reasoning: ReasoningExtractor,
    markdown_roots: Option<Selector>,
    bubble: Option<Selector>,
    interactive: Option<Selector>,
    timestamps: SelectorList,
}

impl Extractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::build(config, Segmenter::new(&config.segment))
    }

    /// Use a custom geometry source for the content-shape fallback.
    pub fn with_layout(config: &ExtractionConfig, layout: Box<dyn Layout>) -> Self {
        Self::build(config, Segmenter::with_layout(&config.segment, layout))
    }

    fn build(config: &ExtractionConfig, segmenter: Segmenter) -> Self {
        let reasoning = ReasoningExtractor::new(&config.reasoning);
        Self {
            min_content_chars: config.min_content_chars,
            segmenter,
            classifier: Classifier::new(&config.classifier, reasoning.clone()),
            reasoning,
            markdown_roots: dom::compile(&config.content.markdown_selector),
            bubble: dom::compile(&config.content.bubble_selector),
            interactive: dom::compile(&config.content.interactive_selector),
            timestamps: SelectorList::compile(&config.content.timestamp_selectors),
        }
    }

    /// Extract using the current time for missing timestamps and `exportDate`.
    pub fn extract(&self, document: &Html, source: &PageSource) -> TranscriptRecord {
        self.extract_at(document, source, Utc::now())
    }

    /// Extract as of the instant `at`.
    pub fn extract_at(&self, document: &Html, source: &PageSource, at: DateTime<Utc>) -> TranscriptRecord {
        let turns = self.extract_turns(document.root_element(), at);
        tracing::info!(turns = turns.len(), "extracted transcript");
        TranscriptRecord::new(turns, metadata(document, source, at))
    }

    /// Turns below `root`, in order. Turns with too little content are skipped.
    pub fn extract_turns(&self, root: ElementRef<'_>, at: DateTime<Utc>) -> Vec<TurnRecord> {
        let fallback_time = iso_timestamp(at);
        self.segmenter
            .segment_in(root)
            .into_iter()
            .enumerate()
            .filter_map(|(index, turn)| self.extract_turn(index, turn, &fallback_time))
            .collect()
    }

    fn extract_turn(&self, index: usize, turn: ElementRef<'_>, fallback_time: &str) -> Option<TurnRecord> {
        let text = dom::text_content(turn);
        let block = self.reasoning.locate(turn);
        let classification =
            self.classifier
                .classify_with_reasoning(turn, text.trim(), block.is_some());
        tracing::trace!(index, ?classification, "classified turn");

        let content = self.primary_content(turn, block.as_ref());
        if char_len(&content) < self.min_content_chars {
            tracing::debug!(index, chars = char_len(&content), "skipping turn with too little content");
            return None;
        }

        let timestamp = self
            .timestamp(turn)
            .unwrap_or_else(|| fallback_time.to_string());
        tracing::debug!(
            index,
            role = %classification.role,
            reasoning = block.is_some(),
            "extracted turn"
        );

        Some(TurnRecord::new(
            classification.role,
            content,
            timestamp,
            block.map(|b| b.reasoning.full_text()),
        ))
    }

    /// Rendered answer text with reasoning and controls excised.
    fn primary_content<'a>(&self, turn: ElementRef<'a>, block: Option<&ReasoningBlock<'a>>) -> String {
        let mut excluded: Vec<ElementRef<'a>> = Vec::new();
        if let Some(interactive) = &self.interactive {
            excluded.extend(turn.select(interactive));
        }
        if let Some(block) = block {
            excluded.push(block.container);
            excluded.extend(block.header_element);
        }

        let roots = self.markdown_roots(turn, block);
        if !roots.is_empty() {
            let parts: Vec<String> = roots
                .into_iter()
                .map(|root| markdown::render_excluding(root, &excluded))
                .filter(|part| !part.is_empty())
                .collect();
            return parts.join("\n\n");
        }

        if let Some(bubble) = self.bubble.as_ref().and_then(|s| turn.select(s).next()) {
            return markdown::render_excluding(bubble, &excluded);
        }

        excluded.extend(self.reasoning.signature_matches(turn));
        markdown::render_excluding(turn, &excluded)
    }

    /// Outermost answer blocks that are not part of the reasoning.
    fn markdown_roots<'a>(&self, turn: ElementRef<'a>, block: Option<&ReasoningBlock<'a>>) -> Vec<ElementRef<'a>> {
        let Some(selector) = &self.markdown_roots else {
            return Vec::new();
        };
        let candidates: Vec<ElementRef<'a>> = turn
            .select(selector)
            .filter(|root| !block.is_some_and(|b| dom::is_within(*root, b.container)))
            .collect();
        candidates
            .iter()
            .copied()
            .filter(|root| {
                !candidates
                    .iter()
                    .any(|outer| outer.id() != root.id() && dom::is_within(*root, *outer))
            })
            .collect()
    }

    fn timestamp(&self, turn: ElementRef<'_>) -> Option<String> {
        let element = self.timestamps.first_match(turn)?;
        element
            .value()
            .attr("datetime")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| {
                let text = dom::text_content(element);
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// Extract with default heuristics, no caller metadata and the current time.
pub fn extract_transcript(document: &Html) -> TranscriptRecord {
    Extractor::default().extract(document, &PageSource::default())
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn metadata(document: &Html, source: &PageSource, at: DateTime<Utc>) -> TranscriptMetadata {
    let url = source
        .url
        .clone()
        .or_else(|| head_attr(document, r#"link[rel="canonical"]"#, "href"))
        .or_else(|| head_attr(document, r#"meta[property="og:url"]"#, "content"))
        .unwrap_or_default();
    let title = source
        .title
        .clone()
        .or_else(|| {
            let selector = dom::compile("title")?;
            let title = document.select(&selector).next()?;
            Some(dom::text_content(title).trim().to_string())
        })
        .unwrap_or_default();
    TranscriptMetadata::new(iso_timestamp(at), url, title)
}

fn head_attr(document: &Html, css: &str, attribute: &str) -> Option<String> {
    let selector = dom::compile(css)?;
    document
        .select(&selector)
        .filter_map(|e| e.value().attr(attribute))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
