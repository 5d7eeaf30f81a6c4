//! Command-line interface definitions.
//!
//! Kept in the library so `xtask` can generate man pages and completions
//! from the same definitions the binary parses.

use std::path::PathBuf;
use std::sync::OnceLock;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::export::ExportFormat;
use crate::transcript::RoleFilter;

/// Version string with build details: `0.1.0 (abc1234 2024-05-01)`.
pub fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        let date = env!("DSX_BUILD_DATE");
        match option_env!("VERGEN_GIT_SHA") {
            Some(sha) if sha != "unknown" => {
                let short = sha.get(..7).unwrap_or(sha);
                format!("{} ({} {})", env!("CARGO_PKG_VERSION"), short, date)
            }
            _ => format!("{} ({})", env!("CARGO_PKG_VERSION"), date),
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "dsx")]
#[command(version, long_version = long_version())]
#[command(about = "Export DeepSeek conversations from saved chat pages")]
#[command(
    long_about = "Reconstructs a DeepSeek conversation from a saved chat page (HTML) \
and exports it as JSON or markdown.

Each message is classified as user or assistant, the assistant's visible \
reasoning is kept separately, and formatting (lists, links, code blocks, tables) \
is preserved as markdown.

EXAMPLES:
    dsx export chat.html                      Write deepseek-chat-<id>-<date>.json
    dsx export chat.html --format markdown    Write a readable document instead
    dsx export chat.html --messages agent --no-thinking --stdout"
)]
pub struct Cli {
    /// Log extraction decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a saved chat page
    Export(ExportArgs),

    /// Show or initialize the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Saved chat page (HTML)
    pub file: PathBuf,

    /// Page URL, used for the chat id when the page does not record it
    #[arg(long)]
    pub url: Option<String>,

    /// Conversation title (defaults to the page <title>)
    #[arg(long)]
    pub title: Option<String>,

    /// Which messages to keep
    #[arg(long, value_enum)]
    pub messages: Option<MessagesArg>,

    /// Drop the assistant's reasoning
    #[arg(long)]
    pub no_thinking: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file (defaults to a name from the configured template)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration if no file exists
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// `--messages` values. The legacy labels stay accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessagesArg {
    #[value(alias = "both")]
    All,
    #[value(alias = "user")]
    Human,
    #[value(alias = "ai", alias = "assistant")]
    Agent,
}

impl From<MessagesArg> for RoleFilter {
    fn from(arg: MessagesArg) -> Self {
        match arg {
            MessagesArg::All => RoleFilter::All,
            MessagesArg::Human => RoleFilter::Human,
            MessagesArg::Agent => RoleFilter::Agent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    #[value(alias = "md")]
    Markdown,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Markdown => ExportFormat::Markdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_with_legacy_labels() {
        let cli = Cli::parse_from(["dsx", "export", "chat.html", "--messages", "ai", "--format", "md"]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.file, PathBuf::from("chat.html"));
        assert_eq!(args.messages.map(RoleFilter::from), Some(RoleFilter::Agent));
        assert_eq!(args.format.map(ExportFormat::from), Some(ExportFormat::Markdown));
        assert!(!args.no_thinking);
    }

    #[test]
    fn output_conflicts_with_stdout() {
        let result = Cli::try_parse_from(["dsx", "export", "a.html", "-o", "x.json", "--stdout"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["dsx", "config", "path", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }

    #[test]
    fn long_version_starts_with_package_version() {
        assert!(long_version().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
