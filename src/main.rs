//! Deskmate terminal host.
//!
//! Owns one long-lived session. Runs a single query with `--query`, or an
//! interactive prompt otherwise. Automation scripts are shown to the user and
//! only run after an explicit "y".

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use deskmate::config::{find_config_path, load_config, AssistantConfig};
use deskmate::inference::InferenceClient;
use deskmate::{AssistantContext, AssistantSession, ExecutionReport, TerminalOutcome};

#[derive(Parser, Clone)]
#[command(name = "deskmate")]
#[command(about = "A natural-language desktop assistant")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Check that the model endpoint is reachable, then exit
    #[arg(long)]
    check: bool,

    /// Write logs to stderr instead of the log file
    #[arg(long)]
    log_stderr: bool,
}

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    deskmate::init_tracing(cli.log_stderr).context("failed to initialize logging")?;

    let config = resolve_config(cli.config.as_deref())?;

    if cli.check {
        let client = InferenceClient::from_config(&config)?;
        let ok = client.health_check().await?;
        println!(
            "{} at {}: {}",
            client.display_name(),
            client.base_url(),
            if ok { "reachable" } else { "unreachable" }
        );
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    let ctx = AssistantContext::from_config(&config)?;
    let mut session = AssistantSession::new(&ctx);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if let Some(query) = cli.query {
        let outcome = session.submit_query(&query).await;
        handle_outcome(&mut session, outcome, &mut input).await?;
        return Ok(());
    }

    println!("Deskmate ({}). Type a request, or 'exit' to quit.", ctx.oracle.model_name());
    loop {
        prompt("> ").await?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        let outcome = session.submit_query(line).await;
        handle_outcome(&mut session, outcome, &mut input).await?;
    }
    Ok(())
}

/// `--config`, then the usual lookup, then the built-in default.
fn resolve_config(explicit: Option<&std::path::Path>) -> Result<AssistantConfig> {
    if let Some(path) = explicit {
        return load_config(path).with_context(|| format!("loading {}", path.display()));
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    match find_config_path(&cwd) {
        Some(path) => {
            tracing::info!(path = %path.display(), "using config file");
            load_config(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => {
            tracing::info!("no config file found, using built-in defaults");
            Ok(AssistantConfig::builtin())
        }
    }
}

async fn handle_outcome(
    session: &mut AssistantSession,
    outcome: TerminalOutcome,
    input: &mut InputLines,
) -> Result<()> {
    match outcome {
        TerminalOutcome::AutomationConfirmationRequired(request) => {
            println!("\nThe assistant wants to run this script:\n");
            for line in request.script_content.lines() {
                println!("    {line}");
            }
            prompt("\nRun it? [y/N] ").await?;
            let answer = input.next_line().await?.unwrap_or_default();
            if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                let report = session.confirm_and_execute(&request.script_content).await;
                render(&report.into_outcome());
            } else {
                session.cancel_confirmation();
                println!("Cancelled.");
            }
        }
        other => render(&other),
    }
    Ok(())
}

fn render(outcome: &TerminalOutcome) {
    match outcome {
        TerminalOutcome::TextResponse { content } => println!("{content}"),
        TerminalOutcome::ToolExecuted { results } => results.iter().for_each(render_report),
        TerminalOutcome::AutomationConfirmationRequired(request) => {
            println!("Script awaiting confirmation ({})", request.request_id)
        }
        TerminalOutcome::Error { message } => eprintln!("error: {message}"),
    }
}

fn render_report(report: &ExecutionReport) {
    if report.success {
        match report.output.as_deref() {
            Some(out) if !out.is_empty() => println!("Done: {out}"),
            _ => println!("Done."),
        }
        if let Some(stderr) = &report.stderr {
            eprintln!("(stderr) {stderr}");
        }
    } else {
        eprintln!(
            "Script failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
}

async fn prompt(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
