//! Export command handler

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use scraper::Html;

use dsx::cli::ExportArgs;
use dsx::export::filename::{self, FilenameContext};
use dsx::export::{self, ExportError, ExportFormat};
use dsx::{Config, Extractor, PageSource, Role, RoleFilter};

/// Extract a saved chat page and write the transcript.
pub fn handle_export(args: &ExportArgs) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let html = fs::read_to_string(&args.file).map_err(|source| ExportError::Read {
        path: args.file.clone(),
        source,
    })?;
    let document = Html::parse_document(&html);
    let source = PageSource {
        url: args.url.clone(),
        title: args.title.clone(),
    };

    let now = Local::now();
    let record = Extractor::new(&config.extraction).extract_at(&document, &source, now.with_timezone(&Utc));
    if record.is_empty() {
        bail!("No messages found in {}", args.file.display());
    }

    let roles = args
        .messages
        .map(RoleFilter::from)
        .unwrap_or(config.export.messages);
    let include_thinking = config.export.include_thinking && !args.no_thinking;
    let record = record.filtered(roles, include_thinking);
    tracing::debug!(%roles, include_thinking, turns = record.len(), "filtered transcript");

    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or(config.export.format);
    let rendered = export::render(&record, format)?;

    if args.stdout {
        println!("{}", rendered);
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let metadata = record.metadata();
            let mut context = FilenameContext::new(&metadata.chat_id, &metadata.title, now.naive_local());
            context.title_max_length = config.export.title_max_length;
            let name = filename::generate(&config.export.filename_template, &context, format.extension())
                .map_err(ExportError::from)?;
            PathBuf::from(name)
        }
    };

    fs::write(&path, &rendered).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    println!(
        "Exported {} messages ({} user, {} assistant) to {} ({})",
        record.len(),
        record.count(Role::Human),
        record.count(Role::Agent),
        path.display(),
        humansize::format_size(rendered.len(), humansize::DECIMAL)
    );
    Ok(())
}
