//! Export file names from templates.
//!
//! Templates mix literal text with tags: `{chat_id}`, `{title}`, `{date}` and
//! `{time}`. Date and time accept a strftime format after a colon, as in
//! `{date:%Y-%m-%d}`. Every substituted value is sanitized so the result is a
//! valid file name on common filesystems.

use chrono::NaiveDateTime;
use deunicode::deunicode;
use thiserror::Error;

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Used when sanitization leaves nothing.
const FALLBACK_NAME: &str = "chat";

const MAX_FILENAME_LENGTH: usize = 255;

/// Longest `{title}` substitution, in characters.
pub const DEFAULT_TITLE_MAX_LENGTH: usize = 60;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIME_FORMAT: &str = "%H%M";

/// Default template, matching the historical `deepseek-chat-<id>-<date>` names.
pub const DEFAULT_TEMPLATE: &str = "deepseek-chat-{chat_id}-{date:%Y-%m-%d}";

/// Errors from template parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template cannot be empty")]
    Empty,
    #[error("Unclosed brace in template")]
    UnclosedBrace,
    #[error("Unmatched closing brace in template")]
    UnmatchedCloseBrace,
    #[error("Unknown template tag: {0}")]
    UnknownTag(String),
    #[error("Invalid format string: {0}")]
    InvalidFormat(String),
}

/// Errors from validating a finished file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    #[error("Filename too long: {length} bytes (max {max})")]
    TooLong { length: usize, max: usize },
}

/// Errors from [`generate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Filename error: {0}")]
    Filename(#[from] FilenameError),
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct FilenameContext<'a> {
    pub chat_id: &'a str,
    pub title: &'a str,
    pub at: NaiveDateTime,
    pub title_max_length: usize,
}

impl<'a> FilenameContext<'a> {
    pub fn new(chat_id: &'a str, title: &'a str, at: NaiveDateTime) -> Self {
        Self {
            chat_id,
            title,
            at,
            title_max_length: DEFAULT_TITLE_MAX_LENGTH,
        }
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    ChatId,
    Title,
    Date(String),
    Time(String),
}

/// A parsed filename template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE).expect("Default template should be valid")
    }
}

impl Template {
    /// Parses a template string into segments.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut chars = template.chars();
        let mut literal = String::new();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }

                    let mut tag = String::new();
                    let mut closed = false;
                    for tc in chars.by_ref() {
                        match tc {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::UnclosedBrace),
                            _ => tag.push(tc),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedBrace);
                    }
                    segments.push(parse_tag(&tag)?);
                }
                '}' => return Err(TemplateError::UnmatchedCloseBrace),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Renders the template. Literal text is kept as written.
    pub fn render(&self, context: &FilenameContext<'_>) -> String {
        let mut result = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => result.push_str(s),
                Segment::ChatId => result.push_str(&sanitize(context.chat_id)),
                Segment::Title => {
                    let title = sanitize(context.title);
                    result.push_str(&truncate_to_length(&title, context.title_max_length));
                }
                Segment::Date(fmt) | Segment::Time(fmt) => {
                    result.push_str(&context.at.format(fmt).to_string());
                }
            }
        }
        result
    }
}

/// Parse, render, append `.{extension}` and validate the length.
pub fn generate(
    template: &str,
    context: &FilenameContext<'_>,
    extension: &str,
) -> Result<String, GenerateError> {
    let rendered = Template::parse(template)?.render(context);
    let suffix = format!(".{}", extension);
    let filename = if rendered.ends_with(&suffix) {
        rendered
    } else {
        format!("{}{}", rendered, suffix)
    };
    validate_length(&filename)?;
    Ok(filename)
}

/// Sanitizes a string for use inside a file name.
///
/// Transliterates to ASCII, turns whitespace into hyphens, drops characters
/// filesystems reject, collapses hyphen runs and trims edge dots and hyphens.
/// Windows device names get a `_` prefix; an empty result becomes `chat`.
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(input);

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;
    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if INVALID_CHARS.contains(&c) {
            continue;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        }
    }

    let trimmed = result.trim_matches(|c| c == '.' || c == ' ' || c == '-');
    let name = handle_reserved_name(trimmed);
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// Rejects names longer than most filesystems allow.
pub fn validate_length(filename: &str) -> Result<(), FilenameError> {
    if filename.len() > MAX_FILENAME_LENGTH {
        Err(FilenameError::TooLong {
            length: filename.len(),
            max: MAX_FILENAME_LENGTH,
        })
    } else {
        Ok(())
    }
}

fn truncate_to_length(s: &str, max_len: usize) -> String {
    let truncated: String = s.chars().take(max_len.max(1)).collect();
    truncated.trim_end_matches(['-', '.']).to_string()
}

/// Prefixes Windows device names (`CON`, `CON.txt`) with `_`.
fn handle_reserved_name(name: &str) -> String {
    let base_name = name.split('.').next().unwrap_or(name);
    let upper = base_name.to_uppercase();
    if WINDOWS_RESERVED.contains(&upper.as_str()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

fn parse_tag(content: &str) -> Result<Segment, TemplateError> {
    let (name, format) = match content.split_once(':') {
        Some((name, format)) => (name, Some(format)),
        None => (content, None),
    };

    match name {
        "chat_id" | "title" => {
            if format.is_some() {
                return Err(TemplateError::InvalidFormat(format!(
                    "{} tag does not accept format",
                    name
                )));
            }
            Ok(if name == "chat_id" {
                Segment::ChatId
            } else {
                Segment::Title
            })
        }
        "date" => Ok(Segment::Date(checked_format(name, format, DEFAULT_DATE_FORMAT)?)),
        "time" => Ok(Segment::Time(checked_format(name, format, DEFAULT_TIME_FORMAT)?)),
        _ => Err(TemplateError::UnknownTag(name.to_string())),
    }
}

fn checked_format(tag: &str, format: Option<&str>, default: &str) -> Result<String, TemplateError> {
    let fmt = format.unwrap_or(default);
    if fmt.is_empty() {
        return Err(TemplateError::InvalidFormat(format!(
            "{} format cannot be empty",
            tag
        )));
    }
    validate_strftime_format(fmt)?;
    Ok(fmt.to_string())
}

/// Checks every `%` specifier with chrono's own parser.
fn validate_strftime_format(fmt: &str) -> Result<(), TemplateError> {
    use chrono::format::{Item, StrftimeItems};

    let mut found_specifier = false;
    for item in StrftimeItems::new(fmt) {
        match item {
            Item::Error => {
                return Err(TemplateError::InvalidFormat(format!(
                    "format string '{}' contains an invalid specifier",
                    fmt
                )))
            }
            Item::Numeric(..) | Item::Fixed(..) => found_specifier = true,
            _ => {}
        }
    }

    if !found_specifier {
        return Err(TemplateError::InvalidFormat(format!(
            "format string '{}' contains no strftime specifiers",
            fmt
        )));
    }
    Ok(())
}
