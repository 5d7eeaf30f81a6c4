//! Markup-to-markdown renderer.
//!
//! Converts an arbitrary HTML subtree into normalized markdown-like text.
//! Rendering happens in three passes that must stay in this order:
//!
//! 1. **Traverse**: a dispatch on element kind produces raw text. Code regions
//!    are not inlined; each `<pre>` is stored in the [`RenderContext`] and
//!    replaced by a sentinel token on its own line.
//! 2. **Collapse**: [`NormalizeWhitespace`] strips trailing blanks and folds
//!    blank-line runs. It only ever sees sentinel tokens, never code.
//! 3. **Substitute**: sentinel tokens become fenced code blocks, carrying the
//!    line prefix (list indentation, `> `) of the token's line.
//!
//! The renderer never fails: unknown elements are rendered transparently and
//! empty input renders to the empty string.

use scraper::{ElementRef, Html, Node};

use super::text::{collapse_inline, NormalizeWhitespace, SENTINEL_CLOSE, SENTINEL_OPEN};

/// Render an element (and everything below it) to markdown.
pub fn render(element: ElementRef<'_>) -> String {
    render_excluding(element, &[])
}

/// Render an element, skipping the given subtrees entirely.
///
/// The document is not modified; excised elements are simply not visited.
pub fn render_excluding<'a>(element: ElementRef<'a>, excluded: &[ElementRef<'a>]) -> String {
    let mut ctx = RenderContext::new(excluded);
    let raw = ctx.render_element(element);
    ctx.finish(&raw)
}

/// Parse an HTML fragment and render it.
pub fn render_html(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    let html = Html::parse_fragment(fragment);
    render(html.root_element())
}

/// How an element is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Heading(usize),
    Block,
    Blockquote,
    List(ListKind),
    ListItem,
    Preformatted,
    HorizontalRule,
    Table,
    LineBreak,
    Strong,
    Emphasis,
    InlineCode,
    Anchor,
    Image,
    /// Contributes nothing (scripts, styles, document head).
    Skip,
}

impl Handler {
    fn is_block(self) -> bool {
        matches!(
            self,
            Handler::Heading(_)
                | Handler::Block
                | Handler::Blockquote
                | Handler::List(_)
                | Handler::ListItem
                | Handler::Preformatted
                | Handler::HorizontalRule
                | Handler::Table
        )
    }
}

/// Dispatch table. `None` means transparent pass-through to children.
fn handler_for(tag: &str) -> Option<Handler> {
    let handler = match tag {
        "h1" => Handler::Heading(1),
        "h2" => Handler::Heading(2),
        "h3" => Handler::Heading(3),
        "h4" => Handler::Heading(4),
        "h5" => Handler::Heading(5),
        "h6" => Handler::Heading(6),
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "figure"
        | "figcaption" | "aside" | "nav" | "details" | "summary" => Handler::Block,
        "blockquote" => Handler::Blockquote,
        "ul" => Handler::List(ListKind::Unordered),
        "ol" => Handler::List(ListKind::Ordered),
        "li" => Handler::ListItem,
        "pre" => Handler::Preformatted,
        "hr" => Handler::HorizontalRule,
        "table" => Handler::Table,
        "br" => Handler::LineBreak,
        "strong" | "b" => Handler::Strong,
        "em" | "i" => Handler::Emphasis,
        "code" => Handler::InlineCode,
        "a" => Handler::Anchor,
        "img" => Handler::Image,
        "script" | "style" | "noscript" | "template" | "svg" | "head" | "title" | "meta"
        | "link" => Handler::Skip,
        _ => return None,
    };
    Some(handler)
}

fn handler_of(element: ElementRef<'_>) -> Option<Handler> {
    handler_for(element.value().name())
}

/// Whether output resumes on a fresh line after (or before) this element.
fn breaks_line(element: ElementRef<'_>) -> bool {
    handler_of(element).is_some_and(|h| h.is_block() || h == Handler::LineBreak)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

/// One active list container.
#[derive(Debug)]
struct ListFrame {
    kind: ListKind,
    /// Items rendered so far in this list (ordered lists only).
    index: usize,
}

/// A code region held back from the collapse pass.
#[derive(Debug)]
struct CodeBlock {
    language: Option<String>,
    body: String,
}

/// Per-call traversal state. Never shared between top-level renders.
struct RenderContext<'a, 'e> {
    list_stack: Vec<ListFrame>,
    code_blocks: Vec<CodeBlock>,
    excluded: &'e [ElementRef<'a>],
}

impl<'a, 'e> RenderContext<'a, 'e> {
    fn new(excluded: &'e [ElementRef<'a>]) -> Self {
        Self {
            list_stack: Vec::new(),
            code_blocks: Vec::new(),
            excluded,
        }
    }

    fn is_excluded(&self, element: ElementRef<'a>) -> bool {
        self.excluded.iter().any(|e| e.id() == element.id())
    }

    fn render_element(&mut self, element: ElementRef<'a>) -> String {
        if self.is_excluded(element) {
            return String::new();
        }

        let Some(handler) = handler_of(element) else {
            return self.render_children(element);
        };

        match handler {
            Handler::Heading(level) => {
                let content = self.render_children(element);
                let content = content.trim();
                if content.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{} {}\n\n", "#".repeat(level), content)
                }
            }
            Handler::Block => {
                let content = self.render_children(element);
                let content = content.trim();
                if content.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{}\n\n", content)
                }
            }
            Handler::Blockquote => self.render_blockquote(element),
            Handler::List(kind) => self.render_list(element, kind),
            Handler::ListItem => self.render_list_item(element),
            Handler::Preformatted => self.render_preformatted(element),
            Handler::HorizontalRule => "\n\n---\n\n".to_string(),
            Handler::Table => self.render_table(element),
            Handler::LineBreak => "\n".to_string(),
            Handler::Strong => {
                let content = self.render_children(element);
                wrap_inline(&content, "**")
            }
            Handler::Emphasis => {
                let content = self.render_children(element);
                wrap_inline(&content, "*")
            }
            Handler::InlineCode => render_inline_code(element),
            Handler::Anchor => self.render_anchor(element),
            Handler::Image => render_image(element),
            Handler::Skip => String::new(),
        }
    }

    fn render_children(&mut self, element: ElementRef<'a>) -> String {
        let parent_is_block = handler_of(element).is_some_and(Handler::is_block);
        let mut result = String::new();

        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let mut value = collapse_inline(text);
                    let leading_edge = match child.prev_sibling() {
                        None => parent_is_block,
                        Some(prev) => ElementRef::wrap(prev).is_some_and(breaks_line),
                    };
                    let trailing_edge = match child.next_sibling() {
                        None => parent_is_block,
                        Some(next) => ElementRef::wrap(next).is_some_and(breaks_line),
                    };
                    if leading_edge {
                        value = value.trim_start().to_string();
                    }
                    if trailing_edge {
                        value = value.trim_end().to_string();
                    }
                    result.push_str(&value);
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        result.push_str(&self.render_element(child_element));
                    }
                }
                _ => {}
            }
        }
        result
    }

    fn render_blockquote(&mut self, element: ElementRef<'a>) -> String {
        let inner = NormalizeWhitespace::default().apply(&self.render_children(element));
        if inner.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = inner
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    }

    fn render_list(&mut self, element: ElementRef<'a>, kind: ListKind) -> String {
        let nested = !self.list_stack.is_empty();
        self.list_stack.push(ListFrame { kind, index: 0 });
        let items = self.render_children(element);
        self.list_stack.pop();

        let items = items.trim_matches('\n');
        if items.trim().is_empty() {
            return String::new();
        }
        // Nested lists hug their parent item; top-level lists are blocks.
        if nested {
            format!("\n{}\n", items)
        } else {
            format!("\n\n{}\n\n", items)
        }
    }

    fn render_list_item(&mut self, element: ElementRef<'a>) -> String {
        let marker = match self.list_stack.last_mut() {
            Some(frame) if frame.kind == ListKind::Ordered => {
                frame.index += 1;
                format!("{}. ", frame.index)
            }
            _ => "- ".to_string(),
        };

        let content = NormalizeWhitespace::default().apply(&self.render_children(element));
        let mut lines = content.split('\n');
        let mut result = format!("{}{}", marker, lines.next().unwrap_or_default());
        for line in lines {
            result.push('\n');
            if !line.is_empty() {
                result.push_str("  ");
                result.push_str(line);
            }
        }
        result.push('\n');
        result
    }

    fn render_preformatted(&mut self, element: ElementRef<'a>) -> String {
        let text: String = element.text().collect();
        let body = text.replace("\r\n", "\n").replace('\r', "\n");
        let body = body.trim_end();
        if body.trim().is_empty() {
            return String::new();
        }

        let index = self.code_blocks.len();
        self.code_blocks.push(CodeBlock {
            language: code_language(element),
            body: body.trim_start_matches('\n').to_string(),
        });
        format!("\n\n{}{}{}\n\n", SENTINEL_OPEN, index, SENTINEL_CLOSE)
    }

    fn render_table(&mut self, element: ElementRef<'a>) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for child in element.child_elements() {
            match child.value().name() {
                "tr" => rows.push(self.render_row(child)),
                "thead" | "tbody" | "tfoot" => {
                    for row in child.child_elements().filter(|r| r.value().name() == "tr") {
                        rows.push(self.render_row(row));
                    }
                }
                _ => {}
            }
        }
        rows.retain(|cells| !cells.is_empty());
        if rows.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (i, cells) in rows.iter().enumerate() {
            lines.push(format!("| {} |", cells.join(" | ")));
            if i == 0 {
                let separator = vec!["---"; cells.len()].join(" | ");
                lines.push(format!("| {} |", separator));
            }
        }
        format!("\n\n{}\n\n", lines.join("\n"))
    }

    fn render_row(&mut self, row: ElementRef<'a>) -> Vec<String> {
        let mut cells = Vec::new();
        for cell in row.child_elements() {
            if !matches!(cell.value().name(), "td" | "th") || self.is_excluded(cell) {
                continue;
            }
            let content = self.render_children(cell);
            cells.push(collapse_inline(&content).trim().replace('|', "\\|"));
        }
        cells
    }

    fn render_anchor(&mut self, element: ElementRef<'a>) -> String {
        let href = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|h| !h.is_empty());
        let content = self.render_children(element);
        let text = content.trim();

        match (text.is_empty(), href) {
            (true, None) => String::new(),
            (true, Some(href)) => format!("[{}]({})", href, href),
            (false, None) => text.to_string(),
            (false, Some(href)) => format!("[{}]({})", text, href),
        }
    }

    /// Pass 2 and 3: collapse, then substitute fenced code.
    fn finish(self, raw: &str) -> String {
        let collapsed = NormalizeWhitespace::default().apply(raw);
        substitute_code_blocks(&collapsed, &self.code_blocks)
    }
}

/// Wrap inline content in emphasis markers, keeping outer spacing outside.
fn wrap_inline(content: &str, marker: &str) -> String {
    let inner = content.trim();
    if inner.is_empty() {
        return if content.is_empty() { String::new() } else { " ".to_string() };
    }
    let leading = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trailing = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", leading, marker, inner, marker, trailing)
}

fn render_inline_code(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    let content = collapse_inline(&text);
    let content = content.trim();
    if content.is_empty() {
        String::new()
    } else if content.contains('`') {
        format!("`` {} ``", content)
    } else {
        format!("`{}`", content)
    }
}

fn render_image(element: ElementRef<'_>) -> String {
    let alt = collapse_inline(element.value().attr("alt").unwrap_or_default());
    let alt = alt.trim();
    match element.value().attr("src").map(str::trim) {
        Some(src) if !src.is_empty() => format!("![{}]({})", alt, src),
        _ => alt.to_string(),
    }
}

/// Language hint from `language-xxx` / `lang-xxx` on the `<pre>` or its `<code>`.
fn code_language(pre: ElementRef<'_>) -> Option<String> {
    let candidates = std::iter::once(pre).chain(
        pre.child_elements()
            .filter(|child| child.value().name() == "code"),
    );
    for element in candidates {
        for class in element.value().classes() {
            let lang = class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"));
            if let Some(lang) = lang.filter(|l| !l.is_empty()) {
                return Some(lang.to_string());
            }
        }
    }
    None
}

/// Replace sentinel tokens with fenced code blocks.
fn substitute_code_blocks(text: &str, blocks: &[CodeBlock]) -> String {
    if blocks.is_empty() {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let Some((prefix, index, rest)) = split_sentinel(line) else {
            lines.push(line.to_string());
            continue;
        };
        let Some(block) = blocks.get(index) else {
            lines.push(format!("{}{}", prefix, rest).trim_end().to_string());
            continue;
        };

        let continuation = continuation_prefix(prefix);
        lines.push(format!(
            "{}```{}",
            prefix,
            block.language.as_deref().unwrap_or_default()
        ));
        for code_line in block.body.split('\n') {
            if code_line.is_empty() {
                lines.push(continuation.trim_end().to_string());
            } else {
                lines.push(format!("{}{}", continuation, code_line));
            }
        }
        lines.push(format!("{}```", continuation));
        if !rest.trim().is_empty() {
            lines.push(format!("{}{}", continuation, rest.trim()));
        }
    }
    lines.join("\n")
}

/// Split a line into (prefix, block index, remainder) around a sentinel token.
fn split_sentinel(line: &str) -> Option<(&str, usize, &str)> {
    let open = line.find(SENTINEL_OPEN)?;
    let after_open = open + SENTINEL_OPEN.len_utf8();
    let close = after_open + line[after_open..].find(SENTINEL_CLOSE)?;
    let index = line[after_open..close].parse().ok()?;
    Some((
        &line[..open],
        index,
        &line[close + SENTINEL_CLOSE.len_utf8()..],
    ))
}

/// Prefix for lines after the first: list markers become indentation,
/// quote markers are kept.
fn continuation_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c == '>' { '>' } else { ' ' })
        .collect()
}
