//! neurobot-cli — command-line frontend for the NeuroBot HTTP API.
//!
//! # Subcommands
//! - `status`                              — show server health
//! - `models`                              — list backend models
//! - `bot create <name>` / `bot list`      — bot bookkeeping
//! - `train file|url|faq|custom`           — feed knowledge to a bot
//! - `docs list|rm`                        — manage training documents
//! - `chat <bot-id> <message>`             — one chat exchange

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};

const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "neurobot-cli",
    version,
    about = "NeuroBot — train and chat with support bots over HTTP"
)]
struct Cli {
    /// NeuroBot HTTP server URL (overrides NEUROBOT_HTTP_URL env var)
    #[arg(long, env = "NEUROBOT_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show NeuroBot server status
    Status,

    /// List models available on the configured backend
    Models,

    /// Bot bookkeeping
    Bot {
        #[command(subcommand)]
        command: BotCommands,
    },

    /// Feed knowledge to a bot
    Train {
        #[command(subcommand)]
        command: TrainCommands,
    },

    /// Manage a bot's training documents
    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },

    /// Send one chat message to a bot
    Chat {
        /// Bot id
        bot: i64,
        /// The message to send
        message: String,
    },
}

#[derive(Debug, Subcommand)]
enum BotCommands {
    /// Create a bot (prints its id and api key)
    Create {
        name: String,

        #[arg(long, default_value_t = 1)]
        user_id: i64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        sector: String,
    },

    /// List a user's bots
    List {
        #[arg(long, default_value_t = 1)]
        user_id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum TrainCommands {
    /// Upload a local file (PDF or plain text)
    File {
        /// Bot id
        bot: i64,
        /// Path to the file
        path: String,
    },

    /// Ingest the readable text of a web page
    Url {
        /// Bot id
        bot: i64,
        /// Page URL
        url: String,
    },

    /// Store a question/answer pair verbatim
    Faq {
        /// Bot id
        bot: i64,
        question: String,
        answer: String,
    },

    /// Store free text
    Custom {
        /// Bot id
        bot: i64,
        content: String,
    },
}

#[derive(Debug, Subcommand)]
enum DocsCommands {
    /// List a bot's training documents
    List {
        /// Bot id
        bot: i64,
    },

    /// Remove one training document
    Rm {
        /// Document id
        id: i64,
    },
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Media type from the file extension. The server only branches on PDF
/// versus everything-else, so this stays deliberately coarse.
pub fn media_type_for(path: &str) -> &'static str {
    let lower = path.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        "text/html"
    } else {
        "text/plain"
    }
}

/// File name portion of a path, for the upload payload.
pub fn file_name_of(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// One-line preview for document listings.
pub fn preview(content: &str, max_chars: usize) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut out: String = line.chars().take(max_chars).collect();
    if line.chars().count() > max_chars {
        out.push('…');
    }
    out
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client() -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()?)
}

/// Send a request and decode the JSON body, exiting with the server's
/// error message on a non-success status.
fn expect_json(resp: reqwest::Result<reqwest::blocking::Response>, url: &str) -> serde_json::Value {
    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            eprintln!("neurobot-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        eprintln!("neurobot-cli: server returned {}: {}", status, message);
        std::process::exit(1);
    }
    body
}

fn do_status(server: &str) -> anyhow::Result<()> {
    let url = format!("{}/health", server);
    let body = expect_json(client()?.get(&url).send(), &url);

    println!("NeuroBot server: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:         {}", body["version"].as_str().unwrap_or("?"));
    println!("SQLite:          {}", body["sqlite"].as_str().unwrap_or("?"));
    println!("Backend:         {}", body["model_backend"].as_str().unwrap_or("?"));
    println!(
        "Model reachable: {}",
        body["model_reachable"].as_bool().unwrap_or(false)
    );
    Ok(())
}

fn do_models(server: &str) -> anyhow::Result<()> {
    let url = format!("{}/models", server);
    let body = expect_json(client()?.get(&url).send(), &url);

    println!("Backend: {}", body["backend"].as_str().unwrap_or("?"));
    match body["models"].as_array() {
        Some(models) if !models.is_empty() => {
            for m in models {
                println!("  {}", m.as_str().unwrap_or("?"));
            }
        }
        _ => println!("  (no models installed)"),
    }
    Ok(())
}

fn do_bot_create(
    server: &str,
    name: &str,
    user_id: i64,
    description: &str,
    sector: &str,
) -> anyhow::Result<()> {
    let url = format!("{}/bots", server);
    let payload = serde_json::json!({
        "user_id": user_id,
        "name": name,
        "description": description,
        "sector": sector,
    });
    let body = expect_json(client()?.post(&url).json(&payload).send(), &url);

    println!("Created bot {} (id {})", name, body["id"]);
    println!("API key: {}", body["api_key"].as_str().unwrap_or("?"));
    Ok(())
}

fn do_bot_list(server: &str, user_id: i64) -> anyhow::Result<()> {
    let url = format!("{}/bots?user_id={}", server, user_id);
    let body = expect_json(client()?.get(&url).send(), &url);

    let bots = body["bots"].as_array().cloned().unwrap_or_default();
    if bots.is_empty() {
        println!("No bots for user {}", user_id);
        return Ok(());
    }
    for b in bots {
        println!(
            "{:>5}  {:<10}  {}",
            b["id"],
            b["status"].as_str().unwrap_or("?"),
            b["name"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}

fn do_train(server: &str, payload: serde_json::Value) -> anyhow::Result<()> {
    let url = format!("{}/train", server);
    let body = expect_json(client()?.post(&url).json(&payload).send(), &url);
    println!("Stored as document {}", body["id"]);
    Ok(())
}

fn do_train_file(server: &str, bot: i64, path: &str) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path, e))?;
    do_train(
        server,
        serde_json::json!({
            "chatbot_id": bot,
            "source": "file",
            "file_name": file_name_of(path),
            "media_type": media_type_for(path),
            "data": BASE64.encode(&bytes),
        }),
    )
}

fn do_docs_list(server: &str, bot: i64) -> anyhow::Result<()> {
    let url = format!("{}/bots/{}/documents", server, bot);
    let body = expect_json(client()?.get(&url).send(), &url);

    let docs = body["documents"].as_array().cloned().unwrap_or_default();
    if docs.is_empty() {
        println!("Bot {} has no training documents", bot);
        return Ok(());
    }
    for d in docs {
        println!(
            "{:>5}  {:<6}  {:<30}  {}",
            d["id"],
            d["source_type"].as_str().unwrap_or("?"),
            d["file_name"].as_str().unwrap_or("?"),
            preview(d["content"].as_str().unwrap_or(""), 60)
        );
    }
    Ok(())
}

fn do_docs_rm(server: &str, id: i64) -> anyhow::Result<()> {
    let url = format!("{}/documents/{}", server, id);
    expect_json(client()?.delete(&url).send(), &url);
    println!("Removed document {}", id);
    Ok(())
}

fn do_chat(server: &str, bot: i64, message: &str) -> anyhow::Result<()> {
    let url = format!("{}/chat", server);
    let payload = serde_json::json!({ "chatbot_id": bot, "message": message });
    let body = expect_json(client()?.post(&url).json(&payload).send(), &url);

    println!("{}", body["response"].as_str().unwrap_or(""));
    if body["via"] != "model" {
        eprintln!("(degraded: {})", body["via"].as_str().unwrap_or("?"));
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Status => do_status(&server),
        Commands::Models => do_models(&server),
        Commands::Bot { command } => match command {
            BotCommands::Create {
                name,
                user_id,
                description,
                sector,
            } => do_bot_create(&server, &name, user_id, &description, &sector),
            BotCommands::List { user_id } => do_bot_list(&server, user_id),
        },
        Commands::Train { command } => match command {
            TrainCommands::File { bot, path } => do_train_file(&server, bot, &path),
            TrainCommands::Url { bot, url } => do_train(
                &server,
                serde_json::json!({ "chatbot_id": bot, "source": "url", "url": url }),
            ),
            TrainCommands::Faq { bot, question, answer } => do_train(
                &server,
                serde_json::json!({
                    "chatbot_id": bot,
                    "source": "faq",
                    "question": question,
                    "answer": answer,
                }),
            ),
            TrainCommands::Custom { bot, content } => do_train(
                &server,
                serde_json::json!({ "chatbot_id": bot, "source": "custom", "content": content }),
            ),
        },
        Commands::Docs { command } => match command {
            DocsCommands::List { bot } => do_docs_list(&server, bot),
            DocsCommands::Rm { id } => do_docs_rm(&server, id),
        },
        Commands::Chat { bot, message } => do_chat(&server, bot, &message),
    };

    if let Err(e) = result {
        eprintln!("neurobot-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
