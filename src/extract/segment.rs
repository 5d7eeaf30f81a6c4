//! Turn segmentation: splitting a page into one node per message.

use scraper::{ElementRef, Html, Selector};

use super::config::SegmentConfig;
use super::dom::{self, SelectorList};
use super::layout::{Bounds, InlineStyleLayout, Layout};
use super::text::char_len;

/// Finds turns by content shape when no structural selector matches.
#[derive(Debug, Clone)]
pub struct ContentShape {
    candidates: Option<Selector>,
    min_text_chars: usize,
    interactive: Option<Selector>,
    excluded_regions: Option<Selector>,
    min_width: f64,
    min_height: f64,
    prefer_innermost: bool,
}

impl ContentShape {
    pub fn new(config: &SegmentConfig) -> Self {
        Self {
            candidates: dom::compile(&config.fallback_candidates),
            min_text_chars: config.min_text_chars,
            interactive: dom::compile(&config.interactive_selector),
            excluded_regions: dom::compile(&config.excluded_regions),
            min_width: config.min_width,
            min_height: config.min_height,
            prefer_innermost: config.prefer_innermost,
        }
    }

    fn qualifies(&self, element: ElementRef<'_>, layout: &dyn Layout) -> bool {
        if char_len(dom::text_content(element).trim()) < self.min_text_chars {
            return false;
        }
        if let Some(interactive) = &self.interactive {
            if element.select(interactive).next().is_some() {
                return false;
            }
        }
        if let Some(regions) = &self.excluded_regions {
            if dom::closest(element, regions).is_some() {
                return false;
            }
        }
        if layout.positioning(element).is_pinned() {
            return false;
        }
        let Bounds { width, height, .. } = layout.bounds(element);
        width.map_or(true, |w| w >= self.min_width) && height.map_or(true, |h| h >= self.min_height)
    }

    fn run<'a>(&self, root: ElementRef<'a>, layout: &dyn Layout) -> Vec<ElementRef<'a>> {
        let Some(candidates) = &self.candidates else {
            return Vec::new();
        };
        let mut found: Vec<ElementRef<'a>> = root
            .select(candidates)
            .filter(|element| self.qualifies(*element, layout))
            .collect();

        if self.prefer_innermost {
            let all = found.clone();
            found.retain(|outer| {
                !all.iter()
                    .any(|inner| inner.id() != outer.id() && dom::is_within(*inner, *outer))
            });
        }

        // Mixed known/unknown positions have no consistent order, keep the document's.
        let tops: Option<Vec<f64>> = found.iter().map(|e| layout.bounds(*e).top).collect();
        if let Some(tops) = tops {
            let mut keyed: Vec<(f64, ElementRef<'a>)> = tops.into_iter().zip(found).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            found = keyed.into_iter().map(|(_, element)| element).collect();
        }
        found
    }
}

/// One way of finding turns.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Structural selectors; the first one with any match wins.
    Selectors(SelectorList),
    ContentShape(ContentShape),
}

impl Strategy {
    /// Run this strategy alone. Results are in document (or visual) order.
    pub fn run<'a>(&self, root: ElementRef<'a>, layout: &dyn Layout) -> Vec<ElementRef<'a>> {
        match self {
            Self::Selectors(selectors) => {
                for (source, selector) in selectors.iter() {
                    let matches: Vec<_> = root.select(selector).collect();
                    if !matches.is_empty() {
                        tracing::debug!(selector = source, turns = matches.len(), "segmented by selector");
                        return matches;
                    }
                }
                Vec::new()
            }
            Self::ContentShape(shape) => {
                let matches = shape.run(root, layout);
                tracing::debug!(turns = matches.len(), "segmented by content shape");
                matches
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Selectors(_) => "selectors",
            Self::ContentShape(_) => "content shape",
        }
    }
}

/// Ordered strategies; the first non-empty result wins.
pub struct Segmenter {
    strategies: Vec<Strategy>,
    layout: Box<dyn Layout>,
}

impl Segmenter {
    pub fn new(config: &SegmentConfig) -> Self {
        Self::with_layout(config, Box::new(InlineStyleLayout))
    }

    pub fn with_layout(config: &SegmentConfig, layout: Box<dyn Layout>) -> Self {
        Self {
            strategies: vec![
                Strategy::Selectors(SelectorList::compile(&config.selectors)),
                Strategy::ContentShape(ContentShape::new(config)),
            ],
            layout,
        }
    }

    /// Turns of a whole document. An empty result is valid.
    pub fn segment<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        self.segment_in(document.root_element())
    }

    /// Turns below `root` (the root itself is never a turn).
    pub fn segment_in<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for strategy in &self.strategies {
            let turns = strategy.run(root, self.layout.as_ref());
            if !turns.is_empty() {
                return turns;
            }
            tracing::debug!(strategy = strategy.name(), "strategy found no turns");
        }
        Vec::new()
    }
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}
