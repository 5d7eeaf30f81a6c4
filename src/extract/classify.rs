//! Role classification for a single turn.
//!
//! Decision order (first rule that fires wins):
//! 1. A class signature unique to one role on the turn itself.
//! 2. An explicit role attribute on the turn or its nearest ancestor carrying one.
//! 3. A reasoning block, which only agents produce.
//! 4. Feature voting: each matching indicator adds one point to its side.
//! 5. On a tie, short texts are human and long ones are agent.

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;
use super::dom;
use super::reasoning::ReasoningExtractor;
use super::text::char_len;
use crate::transcript::Role;

/// A single observable feature that votes for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Indicator {
    /// Some descendant matches the selector
    Descendant { selector: String },
    /// The turn's own class attribute contains the fragment
    ClassContains { fragment: String },
    /// The trimmed turn text begins with the prefix
    TextStartsWith { prefix: String },
    /// The trimmed turn text is shorter than `chars`
    TextShorterThan { chars: usize },
    /// The trimmed turn text is longer than `chars`
    TextLongerThan { chars: usize },
}

impl Indicator {
    pub fn descendant(selector: &str) -> Self {
        Self::Descendant {
            selector: selector.to_string(),
        }
    }

    pub fn class_contains(fragment: &str) -> Self {
        Self::ClassContains {
            fragment: fragment.to_string(),
        }
    }

    fn compile(&self) -> Option<Feature> {
        let test = match self {
            Self::Descendant { selector } => Test::Descendant(dom::compile(selector)?),
            Self::ClassContains { fragment } => Test::ClassContains(fragment.clone()),
            Self::TextStartsWith { prefix } => Test::TextStartsWith(prefix.clone()),
            Self::TextShorterThan { chars } => Test::TextShorterThan(*chars),
            Self::TextLongerThan { chars } => Test::TextLongerThan(*chars),
        };
        Some(Feature {
            name: self.to_string(),
            test,
        })
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descendant { selector } => write!(f, "descendant `{}`", selector),
            Self::ClassContains { fragment } => write!(f, "class contains `{}`", fragment),
            Self::TextStartsWith { prefix } => write!(f, "text starts with `{}`", prefix),
            Self::TextShorterThan { chars } => write!(f, "text shorter than {}", chars),
            Self::TextLongerThan { chars } => write!(f, "text longer than {}", chars),
        }
    }
}

#[derive(Debug, Clone)]
enum Test {
    Descendant(Selector),
    ClassContains(String),
    TextStartsWith(String),
    TextShorterThan(usize),
    TextLongerThan(usize),
}

#[derive(Debug, Clone)]
struct Feature {
    name: String,
    test: Test,
}

impl Feature {
    fn holds(&self, turn: ElementRef<'_>, text: &str, text_chars: usize) -> bool {
        match &self.test {
            Test::Descendant(selector) => turn.select(selector).next().is_some(),
            Test::ClassContains(fragment) => dom::class_contains(turn, fragment),
            Test::TextStartsWith(prefix) => text.starts_with(prefix.as_str()),
            Test::TextShorterThan(chars) => text_chars < *chars,
            Test::TextLongerThan(chars) => text_chars > *chars,
        }
    }
}

/// Which rule decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Signature,
    RoleAttribute,
    Reasoning,
    Score,
    TieBreak,
}

/// Outcome of classifying one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: Role,
    pub rule: Rule,
    pub human_score: usize,
    pub agent_score: usize,
}

impl Classification {
    fn decided(role: Role, rule: Rule) -> Self {
        Self {
            role,
            rule,
            human_score: 0,
            agent_score: 0,
        }
    }
}

/// Decides whether a turn was authored by the human or the agent.
///
/// Total: every turn gets a role, never an error.
#[derive(Debug, Clone)]
pub struct Classifier {
    human_signatures: Vec<String>,
    agent_signatures: Vec<String>,
    role_attributes: Vec<String>,
    human_role_values: Vec<String>,
    agent_role_values: Vec<String>,
    human: Vec<Feature>,
    agent: Vec<Feature>,
    tie_break_chars: usize,
    reasoning: ReasoningExtractor,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig, reasoning: ReasoningExtractor) -> Self {
        let lower = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| v.trim().to_lowercase()).collect()
        };
        Self {
            human_signatures: config.human_signatures.clone(),
            agent_signatures: config.agent_signatures.clone(),
            role_attributes: config.role_attributes.clone(),
            human_role_values: lower(&config.human_role_values),
            agent_role_values: lower(&config.agent_role_values),
            human: config.human_indicators.iter().filter_map(Indicator::compile).collect(),
            agent: config.agent_indicators.iter().filter_map(Indicator::compile).collect(),
            tie_break_chars: config.tie_break_chars,
            reasoning,
        }
    }

    /// Classify a turn from its node and trimmed text.
    pub fn classify(&self, turn: ElementRef<'_>, text: &str) -> Role {
        let has_reasoning = self.reasoning.locate(turn).is_some();
        self.classify_with_reasoning(turn, text, has_reasoning).role
    }

    /// Classify when reasoning detection has already run for this turn.
    pub fn classify_with_reasoning(
        &self,
        turn: ElementRef<'_>,
        text: &str,
        has_reasoning: bool,
    ) -> Classification {
        if let Some(role) = self.signature(turn) {
            return Classification::decided(role, Rule::Signature);
        }
        if let Some(role) = self.role_attribute(turn) {
            return Classification::decided(role, Rule::RoleAttribute);
        }
        if has_reasoning {
            return Classification::decided(Role::Agent, Rule::Reasoning);
        }

        let text_chars = char_len(text);
        let score = |features: &[Feature]| {
            features
                .iter()
                .filter(|feature| {
                    let holds = feature.holds(turn, text, text_chars);
                    if holds {
                        tracing::trace!(indicator = %feature.name, "indicator matched");
                    }
                    holds
                })
                .count()
        };
        let human_score = score(&self.human);
        let agent_score = score(&self.agent);

        let (role, rule) = if human_score > agent_score {
            (Role::Human, Rule::Score)
        } else if agent_score > human_score {
            (Role::Agent, Rule::Score)
        } else if text_chars < self.tie_break_chars {
            (Role::Human, Rule::TieBreak)
        } else {
            (Role::Agent, Rule::TieBreak)
        };

        Classification {
            role,
            rule,
            human_score,
            agent_score,
        }
    }

    fn signature(&self, turn: ElementRef<'_>) -> Option<Role> {
        let has = |fragments: &[String]| fragments.iter().any(|f| dom::class_contains(turn, f));
        if has(&self.human_signatures) {
            Some(Role::Human)
        } else if has(&self.agent_signatures) {
            Some(Role::Agent)
        } else {
            None
        }
    }

    /// Innermost element carrying a recognized role value decides.
    fn role_attribute(&self, turn: ElementRef<'_>) -> Option<Role> {
        dom::self_and_ancestors(turn).find_map(|element| {
            self.role_attributes.iter().find_map(|attribute| {
                let value = element.value().attr(attribute)?.trim().to_lowercase();
                if self.human_role_values.contains(&value) {
                    Some(Role::Human)
                } else if self.agent_role_values.contains(&value) {
                    Some(Role::Agent)
                } else {
                    None
                }
            })
        })
    }
}
