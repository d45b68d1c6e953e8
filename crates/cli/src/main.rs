//! Scour CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Run a prompt file through the LLM and record the output
//! - `chat`     — Interactive chat with per-session history
//! - `research` — Run the research agent over one or more queries
//! - `search`   — Compare keyword / vector / hybrid retrieval over the corpus
//! - `tokens`   — Token estimation and keyword tokenization for a text
//! - `usage`    — Show accumulated API cost totals

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scour",
    about = "Scour — a retrieval-first research agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a prompt file (by id) through the LLM
    Ask {
        /// Prompt file id, resolved to <prompts_dir>/<id>-prompt.txt
        file_id: String,

        /// Override the sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Override the system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Template variable as key=value; repeat for multiple variables
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Chat interactively, with history kept per session
    Chat {
        /// Session id to continue
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// Run the research agent; no queries runs the built-in demo set
    Research {
        /// Queries to research (each gets a fresh run)
        queries: Vec<String>,

        /// Override the step budget
        #[arg(long)]
        max_steps: Option<u32>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Override the sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,
    },

    /// Compare retrieval modes over the document corpus
    Search {
        /// The search query
        query: String,

        /// Number of results per mode
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: usize,

        /// Retrieval mode to run
        #[arg(long, value_enum, default_value = "hybrid")]
        mode: commands::search::Mode,
    },

    /// Estimate tokens for a text (or a file's contents)
    Tokens {
        /// Text to analyze, or a path to a file
        input: String,
    },

    /// Show accumulated cost totals and budget state
    Usage,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            file_id,
            temperature,
            model,
            system,
            vars,
        } => commands::ask::run(&file_id, temperature, model, system, vars).await?,
        Commands::Chat { session } => commands::chat::run(&session).await?,
        Commands::Research {
            queries,
            max_steps,
            model,
            temperature,
        } => commands::research::run(queries, max_steps, model, temperature).await?,
        Commands::Search { query, top_k, mode } => {
            commands::search::run(&query, top_k, mode).await?
        }
        Commands::Tokens { input } => commands::tokens::run(&input)?,
        Commands::Usage => commands::usage::run()?,
    }

    Ok(())
}
