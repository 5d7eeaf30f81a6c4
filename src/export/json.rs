//! JSON wire format.

use crate::transcript::TranscriptRecord;

/// Pretty-printed JSON with two-space indentation.
pub fn to_json(record: &TranscriptRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Parse a previously exported transcript.
pub fn from_json(text: &str) -> Result<TranscriptRecord, serde_json::Error> {
    serde_json::from_str(text)
}
