//! Streaming chat client for OpenAI-compatible completion endpoints.
//!
//! One binary covers both modes: a single prompt streamed to stdout, or
//! an interactive REPL session with slash commands.
//!
//! # Usage
//!
//! ```bash
//! # One-shot: prompt from the command line
//! palaver "Explain SSE in one paragraph"
//!
//! # One-shot: prompt from stdin
//! echo "Explain SSE" | palaver
//!
//! # Interactive session
//! palaver --interactive
//!
//! # Pick a model, wrap output at 80 columns
//! palaver --interactive --model little-teapot --wrap 80
//!
//! # Plain text (no markdown styling), useful for piping
//! palaver --raw "Write a haiku"
//!
//! # See what the endpoint offers
//! palaver --list-models
//! ```
//!
//! The API key is read from the PALAVER_API_KEY environment variable;
//! PALAVER_BASE_URL overrides the endpoint. Exit code is 0 on success
//! and 1 on any reported error.

use std::io::Read;

use arrrg::CommandLine;
use tracing_subscriber::EnvFilter;

use palaver::chat::{ChatArgs, ChatConfig, ChatSession, run_session, run_single_turn};
use palaver::{Client, Error, render};

/// Routes leveled logs to the requested file, ANSI disabled.
fn init_logging(path: &str, level: Option<&str>) -> Result<(), std::io::Error> {
    let file = std::fs::File::create(path)?;
    let filter = EnvFilter::new(level.unwrap_or("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Reads the one-shot prompt from the free arguments or stdin.
fn resolve_prompt(free: &[String]) -> Result<String, Error> {
    let prompt = if free.is_empty() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| Error::io("failed to read prompt from stdin", e))?;
        buffer
    } else {
        free.join(" ")
    };
    let prompt = prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(Error::configuration("prompt is empty after trimming"));
    }
    Ok(prompt)
}

/// Main entry point for the palaver binary.
#[tokio::main]
async fn main() {
    let (args, free) = ChatArgs::from_command_line_relaxed("palaver [OPTIONS] [PROMPT]");

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path, args.log_level.as_deref()) {
            render::print_error(&format!("failed to open log file {}: {}", path, e));
            std::process::exit(1);
        }
    }

    let interactive = args.interactive;
    let list_models = args.list_models;
    let config = ChatConfig::from(args);

    // No client exists yet, so nothing to shut down on this path.
    let mut client = match Client::new(None) {
        Ok(client) => client,
        Err(e) => {
            render::print_error(&e.to_string());
            std::process::exit(1);
        }
    };
    client.set_model(config.model.clone());

    if list_models {
        let code = match client.list_models().await {
            Ok(models) => {
                for model in models {
                    println!("{}", model.id);
                }
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "models listing failed");
                render::print_error(&e.to_string());
                1
            }
        };
        client.shutdown();
        std::process::exit(code);
    }

    if interactive {
        let mut session = ChatSession::new(client, config);
        let code = match run_session(&mut session).await {
            Ok(()) => 0,
            Err(e) => {
                render::print_error(&e.to_string());
                1
            }
        };
        session.shutdown();
        std::process::exit(code);
    }

    let prompt = match resolve_prompt(&free) {
        Ok(prompt) => prompt,
        Err(e) => {
            render::print_error(&e.to_string());
            client.shutdown();
            std::process::exit(1);
        }
    };

    let code = match run_single_turn(&client, &config, &prompt).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "single turn failed");
            render::print_error(&e.to_string());
            1
        }
    };
    client.shutdown();
    std::process::exit(code);
}
