use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use papertutor_core::bootstrap::{AppBuilder, resolve_config_path};
use papertutor_core::{PaperSession, SessionError};
use papertutor_document::DocumentLoader;
use papertutor_llm::provider::LlmProvider;

#[derive(Debug, Parser)]
#[command(name = "papertutor", version, about = "Explain academic papers section by section")]
struct Cli {
    /// Config file (defaults to $PAPERTUTOR_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model name, overriding the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the inferred section outline
    Outline { pdf: PathBuf },
    /// Explain one section, named exactly as in the outline
    Explain { label: String, pdf: PathBuf },
    /// Explain the abstract and introduction
    Summary { pdf: PathBuf },
    /// Ask questions about the paper interactively
    Chat { pdf: PathBuf },
}

impl Command {
    fn pdf(&self) -> &Path {
        match self {
            Self::Outline { pdf }
            | Self::Explain { pdf, .. }
            | Self::Summary { pdf }
            | Self::Chat { pdf } => pdf,
        }
    }
}

/// One line typed in the chat loop.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Sections,
    Explain(&'a str),
    Quit,
    Question(&'a str),
    Empty,
    Usage,
}

fn parse_chat_line(line: &str) -> ChatInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    match trimmed {
        "/quit" | "/exit" => return ChatInput::Quit,
        "/sections" => return ChatInput::Sections,
        _ => {}
    }
    if let Some(label) = trimmed.strip_prefix("/explain") {
        let label = label.trim();
        return if label.is_empty() {
            ChatInput::Usage
        } else {
            ChatInput::Explain(label)
        };
    }
    ChatInput::Question(trimmed)
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let app = AppBuilder::load(config_path, cli.model.as_deref())?;
    let provider = app.build_provider()?;
    let mut session = PaperSession::new(
        provider,
        app.build_loader(),
        app.config().tutor.language.clone(),
    );

    let pdf = cli.command.pdf();
    if !session.load(pdf).await {
        anyhow::bail!("could not extract text from {}", pdf.display());
    }

    match &cli.command {
        Command::Outline { .. } => {
            let markdown = session.structure_markdown().await?;
            println!("{markdown}");
        }
        Command::Explain { label, .. } => {
            let reply = session.explain(label).await?;
            println!("{reply}");
        }
        Command::Summary { .. } => {
            let reply = session.summarize().await?;
            println!("{reply}");
        }
        Command::Chat { .. } => run_chat(&mut session).await?,
    }
    Ok(())
}

async fn run_chat<P: LlmProvider, L: DocumentLoader>(
    session: &mut PaperSession<P, L>,
) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout
        .write_all(b"Ask about the paper. /sections, /explain <label>, /quit\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        let output = match parse_chat_line(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Usage => "Usage: /explain <label>".to_owned(),
            ChatInput::Sections => match session.outline().await {
                Ok(outline) => outline
                    .navigation()
                    .iter()
                    .map(|(section, entries)| format!("{section}\n  {}", entries.join("\n  ")))
                    .collect::<Vec<_>>()
                    .join("\n"),
                Err(e) => describe(&e),
            },
            ChatInput::Explain(label) => match session.explain(label).await {
                Ok(reply) => reply.to_owned(),
                Err(e) => describe(&e),
            },
            ChatInput::Question(question) => match session.ask(question).await {
                Ok(reply) => reply.to_owned(),
                Err(e) => describe(&e),
            },
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n\n").await?;
    }
    Ok(())
}

fn describe(error: &SessionError) -> String {
    tracing::warn!("{error}");
    format!("Error: {error}")
}
