//! dsx - DeepSeek chat exporter
//!
//! Reconstructs conversation transcripts from saved chat pages: segments the
//! page into turns, classifies each turn's author, separates the assistant's
//! visible reasoning and renders content back into markdown.

pub mod cli;
pub mod config;
pub mod export;
pub mod extract;
pub mod transcript;

pub use config::Config;
pub use extract::{extract_transcript, Extractor, PageSource};
pub use transcript::{filter, Role, RoleFilter, TranscriptMetadata, TranscriptRecord, TurnRecord};
