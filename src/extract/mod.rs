//! Transcript extraction from saved chat pages.
//!
//! A chat page is a heap of presentational markup with no stable schema. This
//! module recovers the conversation from it: which nodes are messages, who
//! wrote each one, what the agent "thought" before answering, and what the
//! answer says, rendered back into markdown.
//!
//! # Design Philosophy
//!
//! - **Heuristics are data**: every selector, keyword and threshold lives in
//!   [`ExtractionConfig`] and can be retuned from the config file when the
//!   site's markup drifts
//! - **Never fails**: a page with no recognizable turns yields an empty
//!   transcript, a turn with no reasoning simply has none
//! - **Read-only**: excision skips subtrees while rendering; the parsed
//!   document is never mutated
//!
//! # Module Structure
//!
//! - [`config`] - Selectors and thresholds
//! - [`markdown`] - HTML subtree to markdown renderer
//! - [`reasoning`] - Reasoning block detection
//! - [`classify`] - Role classification
//! - [`segment`] / [`layout`] - Turn segmentation and geometry
//! - [`pipeline`] - Orchestration into a [`TranscriptRecord`](crate::transcript::TranscriptRecord)

mod classify;
mod config;
mod dom;
pub mod layout;
pub mod markdown;
mod pipeline;
mod reasoning;
mod segment;
mod text;

pub use classify::{Classification, Classifier, Indicator, Rule};
pub use config::{ClassifierConfig, ContentConfig, ExtractionConfig, ReasoningConfig, SegmentConfig};
pub use dom::SelectorList;
pub use layout::{Bounds, InlineStyleLayout, Layout, Positioning};
pub use pipeline::{extract_transcript, Extractor, PageSource};
pub use reasoning::{Reasoning, ReasoningBlock, ReasoningExtractor};
pub use segment::{ContentShape, Segmenter, Strategy};
pub use text::{char_len, collapse_inline, normalize_block, NormalizeWhitespace};
