//! pdfrag-populate: index the PDF data directory into the vector store.

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use pdfrag::config::RagConfig;
use pdfrag::library::populate;
use pdfrag::llm::{OllamaClient, OllamaEmbedder};

#[derive(Parser)]
#[command(
    name = "pdfrag-populate",
    version,
    about = "Load PDFs, split them into chunks, and add new chunks to the vector store"
)]
struct Cli {
    /// Delete the whole store before indexing.
    #[arg(long)]
    reset: bool,
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

    OllamaClient::new(config.ollama.clone()).check_models(&[config.ollama.embed_model.as_str()]);

    if cli.reset {
        println!("Clearing Database");
    }

    let embedder = OllamaEmbedder::new(config.ollama.clone());
    let report = populate(&config, &embedder, cli.reset)?;

    println!("Number of existing documents in DB: {}", report.existing);
    if report.added > 0 {
        println!("Adding new documents: {}", report.added);
    } else {
        println!("No new documents to add");
    }

    Ok(())
}
