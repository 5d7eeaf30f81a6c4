//! End-to-end extraction over saved pages.

use scraper::Html;

use dsx::export::json;
use dsx::extract::{ExtractionConfig, Extractor, PageSource};
use dsx::{filter, Role, RoleFilter, TranscriptRecord};

use crate::helpers::{extraction_instant, load_fixture};

fn extract_fixture(name: &str) -> TranscriptRecord {
    let document = Html::parse_document(&load_fixture(name));
    Extractor::default().extract_at(&document, &PageSource::default(), extraction_instant())
}

// ============================================================================
// DeepSeek page structure
// ============================================================================

#[test]
fn deepseek_page_yields_alternating_turns() {
    let record = extract_fixture("deepseek_chat.html");

    let roles: Vec<Role> = record.turns().iter().map(|t| t.role()).collect();
    assert_eq!(roles, vec![Role::Human, Role::Agent, Role::Human, Role::Agent]);
}

#[test]
fn deepseek_page_metadata() {
    let record = extract_fixture("deepseek_chat.html");
    let metadata = record.metadata();

    assert_eq!(metadata.chat_id, "9c1e7a52-04bd-4f7e-b0a1-3d2c");
    assert_eq!(metadata.title, "Sorting in Rust - DeepSeek");
    assert_eq!(metadata.export_date, "2024-05-01T12:00:00.000Z");
}

#[test]
fn human_turn_is_bubble_text_without_controls() {
    let record = extract_fixture("deepseek_chat.html");
    let first = &record.turns()[0];

    assert_eq!(first.content(), "How do I sort a vector of structs by a field in Rust?");
    assert!(!first.has_reasoning());
    assert_eq!(first.timestamp(), "2024-05-01T12:00:00.000Z");
}

#[test]
fn agent_reasoning_is_separated_from_answer() {
    let record = extract_fixture("deepseek_chat.html");
    let answer = &record.turns()[1];

    assert_eq!(
        answer.reasoning(),
        Some(
            "Thought for 6 seconds\n\n\
             The user wants to sort structs by a field.\n\n\
             I should mention `sort_by_key` and `sort_by`."
        )
    );
    assert!(!answer.content().contains("Thought for"));
    assert!(!answer.content().contains("The user wants"));
    assert!(!answer.content().contains("Regenerate"));
}

#[test]
fn agent_answer_keeps_markdown_structure() {
    let record = extract_fixture("deepseek_chat.html");
    let content = record.turns()[1].content();

    assert!(content.starts_with("Use `sort_by_key` when the key is **cheap to copy**:"));
    // Blank lines inside code survive whitespace normalization
    assert!(content.contains(
        "```rust\npeople.sort_by_key(|p| p.age);\n\n\n// compare by reference\n\
         people.sort_by(|a, b| a.name.cmp(&b.name));\n```"
    ));
    assert!(content.contains("- **Stable**: equal elements keep their order"));
    assert!(content.contains("[Vec docs](https://doc.rust-lang.org/std/vec/struct.Vec.html)"));
}

#[test]
fn ordered_lists_are_numbered() {
    let record = extract_fixture("deepseek_chat.html");
    let content = record.turns()[3].content();

    assert!(content.contains("1. Import it\n2. Call `sort_by_key(|p| Reverse(p.age))`"));
}

#[test]
fn extraction_is_idempotent_for_one_instant() {
    let first = json::to_json(&extract_fixture("deepseek_chat.html")).unwrap();
    let second = json::to_json(&extract_fixture("deepseek_chat.html")).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Other page shapes
// ============================================================================

#[test]
fn role_attributes_decide_generic_pages() {
    let record = extract_fixture("generic_chat.html");

    assert_eq!(record.len(), 2);
    assert_eq!(record.turns()[0].role(), Role::Human);
    assert_eq!(record.turns()[1].role(), Role::Agent);
    assert_eq!(record.turns()[0].timestamp(), "2024-03-02T09:15:00Z");
    assert!(record.turns()[1].content().contains("- Ship the beta on Friday\n- Freeze the API"));
    assert_eq!(record.metadata().chat_id, "abc123");
}

#[test]
fn content_shape_fallback_without_structural_markup() {
    let record = extract_fixture("content_shape.html");

    assert_eq!(record.len(), 2);
    assert_eq!(
        record.turns()[0].content(),
        "What is the capital of Australia, and why not Sydney?"
    );
    assert_eq!(record.turns()[0].role(), Role::Human);
    assert_eq!(record.turns()[1].role(), Role::Agent);
    assert!(record.turns()[1].content().starts_with("The capital is Canberra."));
    assert!(!record
        .turns()
        .iter()
        .any(|t| t.content().contains("Cookie") || t.content().contains("Workspace")));
}

#[test]
fn page_without_turns_is_empty_not_an_error() {
    let record = extract_fixture("empty.html");
    assert!(record.is_empty());
    assert_eq!(record.metadata().title, "New chat");
}

#[test]
fn min_content_chars_is_configurable() {
    let mut config = ExtractionConfig::default();
    config.min_content_chars = 1;
    let document = Html::parse_document(&load_fixture("deepseek_chat.html"));
    let record = Extractor::new(&config).extract_at(&document, &PageSource::default(), extraction_instant());

    assert_eq!(record.len(), 5);
    assert_eq!(record.turns()[4].content(), "ok");
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn filtering_agent_without_reasoning() {
    let record = extract_fixture("deepseek_chat.html");
    let filtered = filter(&record, RoleFilter::Agent, false);

    assert_eq!(filtered.len(), 2);
    assert!(filtered.turns().iter().all(|t| t.role() == Role::Agent));
    assert!(filtered.turns().iter().all(|t| !t.has_reasoning()));
    // Input is untouched
    assert!(record.turns()[1].has_reasoning());
}

#[test]
fn filtered_json_reports_no_thinking() {
    let record = extract_fixture("deepseek_chat.html").filtered(RoleFilter::All, false);
    let value: serde_json::Value = serde_json::from_str(&json::to_json(&record).unwrap()).unwrap();

    for message in value["messages"].as_array().unwrap() {
        assert_eq!(message["hasThinking"], false);
        assert!(message["thinkingContent"].is_null());
    }
}
