//! pdfrag CLI: ask questions about the indexed PDF library.

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use pdfrag::config::RagConfig;
use pdfrag::interactive::InteractiveSession;
use pdfrag::llm::{OllamaClient, OllamaEmbedder};
use pdfrag::query::{DisplayOptions, QueryEngine, render_response};

#[derive(Parser)]
#[command(
    name = "pdfrag",
    version,
    about = "Answer questions from indexed PDF documents"
)]
struct Cli {
    /// Question to answer once. Without it, an interactive session starts.
    query_text: Option<String>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RagConfig::discover()?;

    let client = OllamaClient::new(config.ollama.clone());
    client.check_models(&[config.ollama.model.as_str(), config.ollama.embed_model.as_str()]);

    let engine = QueryEngine::new(
        &config.store_dir,
        config.top_k,
        Box::new(OllamaEmbedder::new(config.ollama.clone())),
        Box::new(client),
    );

    match cli.query_text {
        Some(question) => {
            let response = engine.query(&question)?;
            print!("{}", render_response(&response, &DisplayOptions::one_shot()));
        }
        None => {
            let stdin = std::io::stdin();
            let mut session = InteractiveSession::new(stdin.lock(), std::io::stdout());
            let options = session.ask_display_options()?;
            session.run(|question| {
                let response = engine.query(question)?;
                Ok(render_response(&response, &options))
            })?;
        }
    }

    Ok(())
}
