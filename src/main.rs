use clap::Parser;
use clap::Subcommand;

use bardrag::api::serve_api;
use bardrag::config::AppConfig;
use bardrag::eval;
use bardrag::qa::QaService;
use bardrag::Result;

#[derive(Parser)]
#[command(name = "bardrag")]
#[command(about = "Closed-domain Q&A over Romeo and Juliet with graded-relevance classification")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Enable CORS for browser front ends
        #[arg(long)]
        cors: bool,
    },
    /// Answer a single question
    Ask {
        /// The question text
        question: String,
    },
    /// Batch-run questions and emit evaluation records as JSON lines
    Eval {
        /// Path to a question list, one question per line
        #[arg(long)]
        questions: String,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    if cli.verbose {
        bardrag::logging::init_logging_with_level("debug")?;
    } else {
        bardrag::logging::init_logging_with_config(Some(&config))?;
    }

    match cli.command {
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve_api(&config, host, port, cors).await?;
        }
        Commands::Ask { question } => {
            let service = QaService::new(&config).await?;
            let result = service.ask(&question).await?;

            println!("Question type: {}", result.question_type());
            println!("Answer: {}", result.answer);
            if !result.source_passage_ids.is_empty() {
                println!("Sources: {}", result.source_passage_ids.join(", "));
            }
        }
        Commands::Eval { questions, output } => {
            let service = QaService::new(&config).await?;
            let question_list = eval::load_questions(&questions)?;
            let records = eval::run_batch(&service, &question_list).await?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    eval::write_jsonl(&records, file)?;
                    println!("Wrote {} records to {}", records.len(), path);
                }
                None => {
                    eval::write_jsonl(&records, std::io::stdout().lock())?;
                }
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
