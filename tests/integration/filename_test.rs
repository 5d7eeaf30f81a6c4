//! Tests for export filename sanitization and generation.

use chrono::{NaiveDate, NaiveDateTime};

use dsx::export::filename::{
    self, FilenameContext, FilenameError, GenerateError, Segment, Template, TemplateError,
    DEFAULT_TEMPLATE,
};

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 23)
        .unwrap()
        .and_hms_opt(14, 30, 5)
        .unwrap()
}

// ============================================================================
// Sanitization Tests
// ============================================================================

#[test]
fn sanitize_replaces_whitespace_with_hyphens() {
    assert_eq!(filename::sanitize("my \t\n chat"), "my-chat");
}

#[test]
fn sanitize_removes_invalid_characters() {
    assert_eq!(filename::sanitize(r#"a/b\c:d*e?f"g<h>i|j"#), "abcdefghij");
}

#[test]
fn sanitize_transliterates_unicode() {
    assert_eq!(filename::sanitize("Über naïve"), "Uber-naive");
}

#[test]
fn sanitize_trims_edges() {
    assert_eq!(filename::sanitize("--.title.--"), "title");
}

#[test]
fn sanitize_prefixes_windows_reserved_names() {
    assert_eq!(filename::sanitize("NUL"), "_NUL");
    assert_eq!(filename::sanitize("com1.txt"), "_com1.txt");
}

#[test]
fn sanitize_falls_back_when_nothing_is_left() {
    assert_eq!(filename::sanitize("???"), "chat");
}

// ============================================================================
// Template Parsing Tests
// ============================================================================

#[test]
fn parse_default_template() {
    let template = Template::parse(DEFAULT_TEMPLATE).unwrap();
    assert_eq!(
        template.segments(),
        &[
            Segment::Literal("deepseek-chat-".to_string()),
            Segment::ChatId,
            Segment::Literal("-".to_string()),
            Segment::Date("%Y-%m-%d".to_string()),
        ]
    );
}

#[test]
fn parse_uses_default_formats() {
    let template = Template::parse("{date}{time}").unwrap();
    assert_eq!(
        template.segments(),
        &[
            Segment::Date("%Y-%m-%d".to_string()),
            Segment::Time("%H%M".to_string())
        ]
    );
}

#[test]
fn parse_rejects_nested_braces() {
    assert_eq!(Template::parse("{da{te}").unwrap_err(), TemplateError::UnclosedBrace);
}

#[test]
fn parse_rejects_unknown_tags() {
    assert_eq!(
        Template::parse("{user}").unwrap_err(),
        TemplateError::UnknownTag("user".to_string())
    );
}

#[test]
fn parse_rejects_empty_format() {
    assert!(matches!(
        Template::parse("{time:}").unwrap_err(),
        TemplateError::InvalidFormat(_)
    ));
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn generate_default_name() {
    let context = FilenameContext::new("9c1e7a52", "Sorting in Rust", at());
    assert_eq!(
        filename::generate(DEFAULT_TEMPLATE, &context, "json").unwrap(),
        "deepseek-chat-9c1e7a52-2025-01-23.json"
    );
}

#[test]
fn generate_with_title_and_time() {
    let context = FilenameContext::new("x", "Sorting in Rust: a guide", at());
    assert_eq!(
        filename::generate("{title}_{time:%H%M%S}", &context, "md").unwrap(),
        "Sorting-in-Rust-a-guide_143005.md"
    );
}

#[test]
fn generate_reports_template_errors() {
    let context = FilenameContext::new("x", "", at());
    assert_eq!(
        filename::generate("{oops", &context, "json").unwrap_err(),
        GenerateError::Template(TemplateError::UnclosedBrace)
    );
}

#[test]
fn generate_rejects_names_over_255_bytes() {
    let literal = "n".repeat(260);
    let context = FilenameContext::new("x", "", at());
    let err = filename::generate(&literal, &context, "json").unwrap_err();

    assert_eq!(
        err,
        GenerateError::Filename(FilenameError::TooLong {
            length: 265,
            max: 255
        })
    );
    assert!(err.to_string().contains("265"));
}
