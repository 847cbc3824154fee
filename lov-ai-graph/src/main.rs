use clap::{Parser, Subcommand};
use lov_ai_graph::{AgentState, GraphConfig, IndexGraph, IndexState, RetrievalGraph};
use lov_ai_retrieval::{Document, RetrieverProvider, SearchKwargs};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Retrieval-augmented QA over Norwegian statute text.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Vector store to retrieve from
    #[arg(long, default_value = "pinecone")]
    provider: RetrieverProvider,

    /// Embedding model spec
    #[arg(long, default_value = "openai/text-embedding-3-small")]
    embedding_model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question
    Ask {
        /// The question to answer
        question: String,
        /// Number of documents to retrieve per query
        #[arg(short, long, default_value_t = 4)]
        k: usize,
        /// Chat model used for routing and query generation
        #[arg(long, default_value = "openai/gpt-4o-mini")]
        query_model: String,
        /// Chat model used for the final answer
        #[arg(long, default_value = "openai/gpt-4o-mini")]
        response_model: String,
    },
    /// Index documents from a JSON file (array of {id, content, metadata})
    Index {
        /// Path to the documents file
        file: PathBuf,
    },
}

fn build_config(args: &Args) -> GraphConfig {
    GraphConfig::default()
        .with_retriever_provider(args.provider)
        .with_embedding_model(args.embedding_model.clone())
}

async fn run(args: Args) -> anyhow::Result<()> {
    match &args.command {
        Commands::Ask {
            question,
            k,
            query_model,
            response_model,
        } => {
            let config = build_config(&args)
                .with_query_model(query_model.clone())
                .with_response_model(response_model.clone())
                .with_search_kwargs(SearchKwargs::default().with_k(*k));

            let graph = RetrievalGraph::new(config)?;
            let result = graph
                .invoke(AgentState::from_user_message(question.clone()))
                .await?;

            println!("[{}]", result.router.kind);
            println!("{}", result.last_content().unwrap_or(""));
        }
        Commands::Index { file } => {
            let raw = std::fs::read_to_string(file)?;
            let docs: Vec<Document> = serde_json::from_str(&raw)?;

            let graph = IndexGraph::new(build_config(&args));
            let count = graph.invoke(IndexState { docs }).await?;
            println!("Indexed {count} documents");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads credentials from the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
