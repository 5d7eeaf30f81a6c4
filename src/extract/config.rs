//! Configuration for the transcript extraction pipeline.
//!
//! Every selector and threshold here was tuned against one chat site's markup
//! and is expected to drift when that site ships a new release. They are data,
//! not logic: retuning never requires touching the algorithms.

use serde::{Deserialize, Serialize};

use super::classify::Indicator;

/// Configuration for the transcript extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Turns whose rendered content is shorter than this are treated as UI noise
    pub min_content_chars: usize,
    /// Turn segmentation strategies
    pub segment: SegmentConfig,
    /// Role classification indicators and thresholds
    pub classifier: ClassifierConfig,
    /// Reasoning block detection
    pub reasoning: ReasoningConfig,
    /// Primary content location and timestamp lookup
    pub content: ContentConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 10,
            segment: SegmentConfig::default(),
            classifier: ClassifierConfig::default(),
            reasoning: ReasoningConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

/// Turn segmentation: structural selectors first, content shape second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Turn selectors, most specific first
    pub selectors: Vec<String>,
    /// Elements considered by the content-shape fallback
    pub fallback_candidates: String,
    /// Minimum trimmed text length of a fallback candidate
    pub min_text_chars: usize,
    /// Candidates containing any of these are UI, not content
    pub interactive_selector: String,
    /// Candidates inside any of these regions are skipped
    pub excluded_regions: String,
    /// Minimum rendered width (px) when layout is known
    pub min_width: f64,
    /// Minimum rendered height (px) when layout is known
    pub min_height: f64,
    /// Drop fallback candidates that contain another candidate
    pub prefer_innermost: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            selectors: strings(&[
                ".ds-message",
                ".d29f3d7d.ds-message",
                r#"div[class*="fbb737a4"]"#,
                r#"[class*="message"]"#,
                r#"[role="article"]"#,
                "[data-message-id]",
                ".message",
                ".chat-message",
                ".conversation-message",
            ]),
            fallback_candidates: "div, section, article".to_string(),
            min_text_chars: 30,
            interactive_selector: "input, button, select, textarea".to_string(),
            excluded_regions: "nav, header, footer, aside".to_string(),
            min_width: 200.0,
            min_height: 20.0,
            prefer_innermost: true,
        }
    }
}

/// Role classification. See [`crate::extract::Classifier`] for the decision order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Class fragments that mark a human turn outright
    pub human_signatures: Vec<String>,
    /// Class fragments that mark an agent turn outright
    pub agent_signatures: Vec<String>,
    /// Attributes carrying an explicit author role (node or ancestor)
    pub role_attributes: Vec<String>,
    /// Attribute values meaning "human"
    pub human_role_values: Vec<String>,
    /// Attribute values meaning "agent"
    pub agent_role_values: Vec<String>,
    /// Features that vote for a human author
    pub human_indicators: Vec<Indicator>,
    /// Features that vote for an agent author
    pub agent_indicators: Vec<Indicator>,
    /// On a score tie, texts shorter than this are human
    pub tie_break_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            human_signatures: strings(&["d29f3d7d"]),
            agent_signatures: Vec::new(),
            role_attributes: strings(&["data-role", "data-author", "data-message-author-role"]),
            human_role_values: strings(&["user", "human"]),
            agent_role_values: strings(&["assistant", "ai", "agent", "bot", "model"]),
            human_indicators: vec![
                Indicator::descendant(".fbb737a4"),
                Indicator::descendant(r#"[class*="avatar-user"], [data-testid="user-avatar"]"#),
                Indicator::descendant(r#"[class*="icon-user"]"#),
                Indicator::class_contains("human"),
                Indicator::TextShorterThan { chars: 600 },
            ],
            agent_indicators: vec![
                Indicator::descendant(".ds-markdown"),
                Indicator::descendant("pre, code"),
                Indicator::class_contains("assistant"),
                Indicator::class_contains("_7d763a7"),
                Indicator::TextStartsWith {
                    prefix: "Thought for".to_string(),
                },
                Indicator::TextLongerThan { chars: 900 },
            ],
            tie_break_chars: 800,
        }
    }
}

/// Reasoning ("thinking") block detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Container selectors, in priority order
    pub signatures: Vec<String>,
    /// Header selectors searched within the turn
    pub header_selectors: Vec<String>,
    /// Header used when no header element exists
    pub default_header: String,
    /// Keywords for the fallback scan (case-insensitive)
    pub keywords: Vec<String>,
    /// Parent text markers confirming a keyword hit
    pub marker_texts: Vec<String>,
    /// Parent class fragments confirming a keyword hit
    pub marker_class_fragments: Vec<String>,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            signatures: strings(&[
                ".ds-think-content",
                r#"[class*="think-content"]"#,
                r#"[data-testid="think-content"]"#,
                ".thinking-content",
                r#"[class*="thinking"]"#,
                ".thought-process",
            ]),
            header_selectors: strings(&[
                "span._5255ff8",
                r#"[class*="think-title"]"#,
                r#"[class*="thought-title"]"#,
                ".thinking-header",
                r#"[class*="thinking-header"]"#,
            ]),
            default_header: "Thinking Process".to_string(),
            keywords: strings(&["thinking", "thought", "reasoning", "analyzing"]),
            marker_texts: strings(&["💭"]),
            marker_class_fragments: strings(&["think", "thought"]),
        }
    }
}

/// Where a turn's answer lives, and where its timestamp might be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Rendered answer blocks (preferred content roots)
    pub markdown_selector: String,
    /// User message bubble (second choice)
    pub bubble_selector: String,
    /// Controls excised before rendering
    pub interactive_selector: String,
    /// Timestamp element selectors, in priority order
    pub timestamp_selectors: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            markdown_selector: ".ds-markdown".to_string(),
            bubble_selector: ".fbb737a4".to_string(),
            interactive_selector: r#"button, input, select, textarea, [role="button"]"#.to_string(),
            timestamp_selectors: strings(&[
                "time",
                r#"[class*="timestamp"]"#,
                r#"[class*="time"]"#,
                "[datetime]",
            ]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
