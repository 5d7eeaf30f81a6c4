//! The transcript data model and its persisted wire shape.
//!
//! Field names of the wire shape (`messages`, `type`, `hasThinking`,
//! `thinkingContent`, `exportDate`, `chatId`) are read by other tools and must
//! not change.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    Human,
    #[serde(rename = "assistant")]
    Agent,
}

impl Role {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "user",
            Self::Agent => "assistant",
        }
    }

    /// Display name used in exported documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::Human => "User",
            Self::Agent => "DeepSeek AI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the conversation.
///
/// `has_reasoning` is derived from `reasoning`, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireTurn", into = "WireTurn")]
pub struct TurnRecord {
    role: Role,
    content: String,
    timestamp: String,
    reasoning: Option<String>,
}

impl TurnRecord {
    /// Blank reasoning is stored as absent.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        timestamp: impl Into<String>,
        reasoning: Option<String>,
    ) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp.into(),
            reasoning: reasoning.filter(|r| !r.trim().is_empty()),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    pub fn has_reasoning(&self) -> bool {
        self.reasoning.is_some()
    }

    /// Copy of this turn with the reasoning dropped.
    pub fn without_reasoning(&self) -> Self {
        Self {
            reasoning: None,
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTurn {
    #[serde(rename = "type")]
    role: Role,
    content: String,
    timestamp: String,
    #[serde(default)]
    has_thinking: bool,
    #[serde(default)]
    thinking_content: Option<String>,
}

impl From<WireTurn> for TurnRecord {
    /// `hasThinking: false` wins over a stray `thinkingContent`.
    fn from(wire: WireTurn) -> Self {
        let reasoning = wire.thinking_content.filter(|_| wire.has_thinking);
        TurnRecord::new(wire.role, wire.content, wire.timestamp, reasoning)
    }
}

impl From<TurnRecord> for WireTurn {
    fn from(turn: TurnRecord) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
            timestamp: turn.timestamp,
            has_thinking: turn.reasoning.is_some(),
            thinking_content: turn.reasoning,
        }
    }
}

/// Where and when a transcript was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMetadata {
    pub export_date: String,
    pub url: String,
    pub title: String,
    pub chat_id: String,
}

impl TranscriptMetadata {
    /// `chat_id` is derived from `url`.
    pub fn new(export_date: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            export_date: export_date.into(),
            chat_id: chat_id_from_url(&url),
            url,
            title: title.into(),
        }
    }
}

/// An ordered conversation plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    #[serde(rename = "messages")]
    turns: Vec<TurnRecord>,
    metadata: TranscriptMetadata,
}

impl TranscriptRecord {
    pub fn new(turns: Vec<TurnRecord>, metadata: TranscriptMetadata) -> Self {
        Self { turns, metadata }
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn metadata(&self) -> &TranscriptMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// See [`filter`].
    pub fn filtered(&self, roles: RoleFilter, include_reasoning: bool) -> Self {
        filter(self, roles, include_reasoning)
    }
}

/// Which roles to keep when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    #[default]
    #[serde(alias = "both")]
    All,
    #[serde(alias = "user")]
    Human,
    #[serde(alias = "ai", alias = "assistant")]
    Agent,
}

impl RoleFilter {
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::Human => role == Role::Human,
            Self::Agent => role == Role::Agent,
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Human => "human",
            Self::Agent => "agent",
        })
    }
}

impl FromStr for RoleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "both" => Ok(Self::All),
            "human" | "user" => Ok(Self::Human),
            "agent" | "ai" | "assistant" => Ok(Self::Agent),
            other => Err(format!(
                "unknown message filter '{}' (expected all, human or agent)",
                other
            )),
        }
    }
}

/// Keep only turns admitted by `roles`, optionally dropping reasoning.
///
/// Pure: the input record is untouched.
pub fn filter(record: &TranscriptRecord, roles: RoleFilter, include_reasoning: bool) -> TranscriptRecord {
    let turns = record
        .turns
        .iter()
        .filter(|turn| roles.admits(turn.role))
        .map(|turn| {
            if include_reasoning {
                turn.clone()
            } else {
                turn.without_reasoning()
            }
        })
        .collect();
    TranscriptRecord::new(turns, record.metadata.clone())
}

/// Conversation identifier from a `/s/<id>` url path, else `"unknown"`.
pub fn chat_id_from_url(url: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"/s/([a-f0-9-]+)").expect("chat id pattern is valid"));

    pattern
        .captures(url_path(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Path component of an absolute or relative url, without query or fragment.
fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(scheme_end) => {
            let after = &url[scheme_end + 3..];
            match after.find('/') {
                Some(slash) => &after[slash..],
                None => "",
            }
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}
