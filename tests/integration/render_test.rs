//! Markdown rendering through the public API.

use scraper::Html;

use dsx::extract::markdown::{render, render_html};
use dsx::extract::{Extractor, PageSource};

use crate::helpers::extraction_instant;

#[test]
fn list_items_keep_inline_formatting() {
    assert_eq!(
        render_html("<ul><li>First item</li><li>Second item</li></ul>"),
        "- First item\n- Second item"
    );
    assert_eq!(render_html("<ul><li><strong>Bold detail</strong></li></ul>"), "- **Bold detail**");
}

#[test]
fn runs_of_blank_lines_collapse_to_one() {
    let markdown = render_html("<div>one<br><br><br><br><br>two</div>");
    assert_eq!(markdown, "one\n\ntwo");
}

#[test]
fn render_of_a_parsed_document_subtree() {
    let document = Html::parse_document(
        r#"<html><body><div id="answer"><h3>Steps</h3><p>Run <code>cargo fmt</code> first.</p></div></body></html>"#,
    );
    let selector = scraper::Selector::parse("#answer").unwrap();
    let answer = document.select(&selector).next().unwrap();

    assert_eq!(render(answer), "### Steps\n\nRun `cargo fmt` first.");
}

#[test]
fn code_inside_list_in_agent_answer() {
    let page = r#"<html><body>
        <div class="ds-message">
          <div class="ds-markdown">
            <ol>
              <li>Create the file:
                <pre><code class="language-toml">[package]

name = "demo"</code></pre>
              </li>
              <li>Build it</li>
            </ol>
          </div>
        </div>
    </body></html>"#;
    let document = Html::parse_document(page);
    let record = Extractor::default().extract_at(&document, &PageSource::default(), extraction_instant());

    assert_eq!(record.len(), 1);
    assert_eq!(
        record.turns()[0].content(),
        "1. Create the file:\n\n  ```toml\n  [package]\n\n  name = \"demo\"\n  ```\n2. Build it"
    );
}
