use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use notebook::config::Config;
use notebook::error::NotebookError;
use notebook::intelligence::KnowledgeGraphService;
use notebook::llm::{create_ai_service, AiService};
use notebook::models::{ArtifactType, SourceDocument};
use notebook::processing::SourceLoader;
use notebook::services::{
    AskQuestionHandler, AskQuestionRequest, GenerateArtifactHandler,
    GenerateFollowUpQuestionsHandler, NotebookSession,
};
use notebook::vault::ObsidianVault;

#[derive(Parser)]
#[command(name = "notebook")]
#[command(about = "Ask questions about your documents and Obsidian notes")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Document to load (repeatable)
    #[arg(long = "source", short = 's')]
    sources: Vec<PathBuf>,

    /// Also load notes from OBSIDIAN_VAULT_PATH
    #[arg(long)]
    vault: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the loaded sources
    Ask {
        question: String,
        #[command(flatten)]
        sources: SourceArgs,
        /// Suggest follow-up questions after the answer
        #[arg(long)]
        follow_ups: bool,
    },
    /// Generate a study artifact (faq, study_guide, summary, ...)
    Artifact {
        artifact_type: ArtifactType,
        #[command(flatten)]
        sources: SourceArgs,
        /// Save the artifact as a note in the vault
        #[arg(long)]
        save: bool,
    },
    /// Print the keyword graph of the loaded sources as JSON
    Graph {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Check the configured backend and list its models
    Models,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing(args.json);

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Input problems get the bare message and exit code 2; everything else
/// prints the full error chain.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<NotebookError>() {
        Some(NotebookError::Cancelled) => {
            eprintln!("Cancelled.");
            ExitCode::from(130)
        }
        Some(e) if e.is_user_error() => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
        _ => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env();
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match command {
        Command::Ask {
            question,
            sources,
            follow_ups,
        } => {
            let ai = create_ai_service(&config.ai)?;
            let mut session = load_session(&config, &sources, &cancel).await?;

            let handler = AskQuestionHandler::new(ai.clone(), &config);
            let response = handler
                .handle(
                    AskQuestionRequest {
                        question: &question,
                        sources: session.sources(),
                        history: session.history(),
                    },
                    &cancel,
                )
                .await?;

            println!("{}", response.assistant_message.content);
            if !response.assistant_message.citations.is_empty() {
                println!("\nSources: {}", response.assistant_message.citations.join(", "));
            }
            session.record_exchange(&response);

            if follow_ups {
                let questions = GenerateFollowUpQuestionsHandler::new(ai, &config)
                    .handle(session.sources(), session.history(), &cancel)
                    .await?;
                println!("\nFollow-up questions:");
                for question in questions {
                    println!("- {question}");
                }
            }
        }
        Command::Artifact {
            artifact_type,
            sources,
            save,
        } => {
            let ai = create_ai_service(&config.ai)?;
            let session = load_session(&config, &sources, &cancel).await?;

            let artifact = GenerateArtifactHandler::new(ai, &config)
                .handle(artifact_type, session.sources(), &cancel)
                .await?;

            println!("# {}\n\n{}", artifact.title, artifact.content);

            if save {
                let path = open_vault(&config)?.save_note(
                    &artifact.title,
                    &artifact.content,
                    &artifact.citations,
                )?;
                println!("\nSaved to {}", path.display());
            }
        }
        Command::Graph { sources } => {
            let session = load_session(&config, &sources, &cancel).await?;
            let graph = KnowledgeGraphService::new().build_graph(session.sources());
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Command::Models => {
            let ai = create_ai_service(&config.ai)?;
            print_models(ai.as_ref(), &cancel).await?;
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notebook=info".into()),
        )
        .with(fmt_layer)
        .init();
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Interrupt received, cancelling request...");
        cancel.cancel();
    }
}

fn open_vault(config: &Config) -> anyhow::Result<ObsidianVault> {
    let path = config
        .vault
        .path
        .clone()
        .context("OBSIDIAN_VAULT_PATH is not set")?;
    Ok(ObsidianVault::new(path)?)
}

async fn load_session(
    config: &Config,
    args: &SourceArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<NotebookSession> {
    let mut session = NotebookSession::new();

    let loader = SourceLoader::new();
    session.add_sources(loader.load_all(args.sources.as_slice(), cancel).await?);

    if args.vault {
        let notes: Vec<SourceDocument> =
            open_vault(config)?.load_notes(config.vault.subfolder.as_deref())?;
        session.add_sources(notes);
    }

    tracing::info!(sources = session.sources().len(), "Session ready");
    Ok(session)
}

async fn print_models(ai: &dyn AiService, cancel: &CancellationToken) -> anyhow::Result<()> {
    ai.health_check(cancel)
        .await
        .with_context(|| format!("{} backend is not healthy", ai.name()))?;

    println!("{} is reachable (configured model: {})", ai.name(), ai.model());
    for model in ai.list_models(cancel).await? {
        println!("- {model}");
    }
    Ok(())
}
