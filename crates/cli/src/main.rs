//! kgchat CLI
//!
//! `kgchat serve` runs the HTTP backend; the remaining subcommands are a
//! thin client for a running server, including an interactive chat loop.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgchat_server::AppState;
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_SERVER: &str = "http://localhost:8000";

/// kgchat - build a knowledge graph from anything you upload and chat with it
#[derive(Parser)]
#[command(name = "kgchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP backend
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: String,

        /// Directory for the store, uploaded content, and statement logs
        #[arg(long, default_value = "./kgchat-data")]
        data_dir: PathBuf,

        /// Use in-memory storage (for testing; nothing survives restart)
        #[arg(long)]
        memory: bool,
    },

    /// Chat with the knowledge graph interactively
    Chat {
        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Upload inline text, a YouTube/Wikipedia URL, or a .txt/.wav file
    Upload {
        /// Inline text content
        text: Option<String>,

        /// YouTube or Wikipedia URL
        #[arg(long, conflicts_with = "text")]
        url: Option<String>,

        /// Path to a .txt or .wav file
        #[arg(long, conflicts_with_all = ["text", "url"])]
        file: Option<PathBuf>,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Ask a single question
    Query {
        question: String,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Show entity and relationship counts
    Info {
        /// Server base URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    message: String,
    num_entity: i64,
    num_relation: i64,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    answer: String,
    query: String,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    num_entity: i64,
    num_relation: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve {
            addr,
            data_dir,
            memory,
        } => cmd_serve(addr, data_dir, memory).await?,
        Commands::Chat { server } => cmd_chat(server).await?,
        Commands::Upload {
            text,
            url,
            file,
            server,
        } => cmd_upload(server, text, url, file).await?,
        Commands::Query { question, server } => cmd_query(server, question).await?,
        Commands::Info { server } => cmd_info(server).await?,
    }

    Ok(())
}

async fn cmd_serve(addr: String, data_dir: PathBuf, memory: bool) -> Result<()> {
    let db = if memory {
        info!("Using in-memory store");
        kgchat_db::init_memory().await?
    } else {
        let db_path = data_dir.join("db");
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        info!("Using store at: {}", db_path.display());
        kgchat_db::init_persistent(&db_path).await?
    };

    let state = AppState::new(db, &data_dir);
    kgchat_server::serve(&addr, state)
        .await
        .with_context(|| format!("Server failed on {}", addr))?;

    Ok(())
}

async fn cmd_chat(server: String) -> Result<()> {
    let client = reqwest::Client::new();

    println!("kgchat - chat with your knowledge graph");
    println!("Type a question, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("kgchat> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let question = line.trim();
        match question {
            "" => continue,
            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }

        let response = client
            .post(format!("{}/query", server))
            .json(&serde_json::json!({ "text": question }))
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                let result: QueryResponse = response.json().await?;
                println!("{}", result.answer);
                if !result.query.is_empty() {
                    println!("  [query: {}]", result.query);
                }
            }
            Ok(response) => {
                let status = response.status();
                let message = error_message(response).await;
                println!("Error ({}): {}", status, message);
            }
            Err(e) => println!("Error: {}", e),
        }

        println!();
    }

    Ok(())
}

async fn cmd_upload(
    server: String,
    text: Option<String>,
    url: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let client = reqwest::Client::new();

    let response = if let Some(path) = file {
        let content_type = match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => "text/plain",
            Some("wav") => "audio/wav",
            _ => anyhow::bail!("Unsupported file type. Use 'txt' or 'wav'."),
        };

        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        client
            .post(format!("{}/upload-file", server))
            .multipart(form)
            .send()
            .await?
    } else {
        let body = match (text, url) {
            (Some(text), _) => serde_json::json!({ "text": text }),
            (None, Some(url)) => serde_json::json!({ "url": url }),
            (None, None) => anyhow::bail!("Provide inline text, --url, or --file"),
        };

        client
            .post(format!("{}/upload-text", server))
            .json(&body)
            .send()
            .await?
    };

    if !response.status().is_success() {
        let status = response.status();
        anyhow::bail!("Upload failed ({}): {}", status, error_message(response).await);
    }

    let result: UploadResponse = response.json().await?;
    println!("{}", result.message);
    println!(
        "Graph now holds {} entities and {} relationships",
        result.num_entity, result.num_relation
    );

    Ok(())
}

async fn cmd_query(server: String, question: String) -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/query", server))
        .json(&serde_json::json!({ "text": question }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        anyhow::bail!("Query failed ({}): {}", status, error_message(response).await);
    }

    let result: QueryResponse = response.json().await?;
    println!("{}", result.answer);
    if !result.query.is_empty() {
        println!("  [query: {}]", result.query);
    }

    Ok(())
}

async fn cmd_info(server: String) -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/info", server))
        .send()
        .await?
        .error_for_status()?;

    let info: InfoResponse = response.json().await?;
    println!("Entities: {}", info.num_entity);
    println!("Relationships: {}", info.num_relation);

    Ok(())
}

async fn error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => "(no error details)".to_string(),
    }
}
