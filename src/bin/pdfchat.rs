//! CLI binary for pdfchat.
//!
//! A thin interactive shim over the library crate: reads lines from stdin,
//! relays them through a [`ChatSession`], and renders the conversation.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfchat::{ChatConfig, ChatSession, Role, SendOutcome, SourceFile, Turn, TurnKind};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start a plain chat session
  pdfchat

  # Attach documents up front and ask about them
  pdfchat --attach report.pdf --attach appendix.pdf

  # Use a specific model
  pdfchat --model gemini-2.5-pro

IN-SESSION COMMANDS:
  /attach <file> [<file>…]   Extract the PDFs and hold their text for the
                             next message (one-shot: context rides along on
                             exactly one request)
  /clear                     Clear the conversation, pending context included
  /quit                      Exit

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY     API credential (requests fail upstream without one)
  PDFCHAT_MODEL      Override the completion model
  PDFCHAT_API_BASE   Override the API base URL (proxies, tests)
  PDFIUM_LIB_PATH    Path to an existing libpdfium shared library

SETUP:
  1. Install the pdfium shared library (or set PDFIUM_LIB_PATH).
  2. export GEMINI_API_KEY=...
  3. pdfchat --attach document.pdf
"#;

/// Chat with a language model grounded in your PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdfchat",
    version,
    about = "Chat with a language model grounded in your PDF documents",
    long_about = "Interactive chat against the Gemini completion API. Attached PDFs are \
converted to plain text and injected into the next outgoing message only, so document \
context never pollutes the permanent conversation history.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to attach before the first message.
    #[arg(short, long = "attach", value_name = "FILE")]
    attach: Vec<PathBuf>,

    /// Completion model ID.
    #[arg(long, env = "PDFCHAT_MODEL", default_value = pdfchat::DEFAULT_MODEL)]
    model: String,

    /// API credential.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// Base URL of the completion API.
    #[arg(long, env = "PDFCHAT_API_BASE", default_value = pdfchat::DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "PDFCHAT_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCHAT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and replies.
    #[arg(short, long, env = "PDFCHAT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the conversation itself, so
    // the default filter only lets warnings through.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build session ────────────────────────────────────────────────────
    let config = ChatConfig::builder()
        .api_key(cli.api_key.clone())
        .model(cli.model.clone())
        .api_base(cli.api_base.clone())
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;

    let session = ChatSession::connect(&config).context("Failed to create session")?;

    if !cli.quiet {
        eprintln!(
            "{} {}   {}",
            cyan("◆"),
            bold("pdfchat — chat with your PDFs"),
            dim("/attach <file>  /clear  /quit")
        );
        if cli.api_key.is_empty() {
            eprintln!(
                "{} GEMINI_API_KEY is not set — requests will fail upstream",
                red("!")
            );
        }
    }

    if !cli.attach.is_empty() {
        attach_paths(&session, &cli.attach).await;
    }

    // ── REPL ─────────────────────────────────────────────────────────────
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    prompt();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = line.trim().to_string();

        if input.is_empty() {
            prompt();
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            let mut words = command.split_whitespace();
            match words.next() {
                Some("quit") | Some("exit") => break,
                Some("clear") => {
                    session.clear();
                    eprintln!("{}", dim("Conversation cleared."));
                }
                Some("attach") => {
                    let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
                    if paths.is_empty() {
                        eprintln!("{}", red("Usage: /attach <file> [<file>…]"));
                    } else {
                        attach_paths(&session, &paths).await;
                    }
                }
                other => {
                    eprintln!(
                        "{}",
                        red(&format!("Unknown command: /{}", other.unwrap_or_default()))
                    );
                }
            }
            prompt();
            continue;
        }

        // The original UI shows a "Typing…." placeholder while the request
        // is in flight; a spinner is the terminal equivalent.
        let spinner = typing_spinner();
        let outcome = session.send(&input).await;
        spinner.finish_and_clear();

        match outcome {
            SendOutcome::Replied(turn) => render_turn(&turn),
            SendOutcome::Rejected => eprintln!("{}", dim("(nothing sent)")),
        }
        prompt();
    }

    Ok(())
}

fn prompt() {
    print!("{} ", bold("you ❯"));
    io::stdout().flush().ok();
}

fn typing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Typing….");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Read the given paths and attach them to the session, reporting per-file
/// results in upload order.
async fn attach_paths(session: &ChatSession, paths: &[PathBuf]) {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(SourceFile::new(display_name(path), bytes)),
            Err(e) => eprintln!("{} {}: {}", red("✗"), path.display(), e),
        }
    }
    if files.is_empty() {
        return;
    }

    match session.attach(files).await {
        Ok(outcome) => {
            for meta in &outcome.attached {
                println!(
                    "{} {} {}",
                    green("✓"),
                    bold(&meta.name),
                    dim(&format!(
                        "{} pages • {} • PDF",
                        meta.page_count, meta.size_label
                    ))
                );
            }
            for failure in &outcome.failures {
                eprintln!("{} {}", red("✗"), failure);
            }
        }
        Err(e) => eprintln!("{} {}", red("✗"), e),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render one turn the way the chat transcript shows it.
fn render_turn(turn: &Turn) {
    let stamp = dim(&turn.created_at.with_timezone(&Local).format("%H:%M").to_string());
    match turn.kind {
        TurnKind::FileSummary => {
            if let Some(meta) = &turn.file_meta {
                println!(
                    "{} {} {}  {}",
                    cyan("▤"),
                    bold(&meta.name),
                    dim(&format!(
                        "{} pages • {} • PDF",
                        meta.page_count, meta.size_label
                    )),
                    stamp
                );
            }
        }
        TurnKind::Text => {
            let speaker = match turn.role {
                Role::User => bold("you ❯"),
                Role::Assistant | Role::System => cyan("bot ❯"),
            };
            println!("{} {}  {}", speaker, turn.content, stamp);
        }
    }
}
