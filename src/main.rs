// src/main.rs

//! `kov`: a local agent that plans and runs sandboxed tools against a workspace.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use kov::{Agent, AgentConfig, ConfirmMode, TurnReport, logging};

/// Flags override `KOV_WORKSPACE_ROOT`, `KOV_MODEL` and `OLLAMA_HOST`.
#[derive(Parser)]
#[command(name = "kov", version, about = "Local agent with a sandboxed tool set")]
struct Cli {
    /// Directory every tool is confined to. Defaults to the current directory.
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Ollama model name [default: llama3.2:3b]
    #[arg(long)]
    model: Option<String>,

    /// Ollama base URL [default: http://localhost:11434]
    #[arg(long = "ollama-url")]
    ollama_url: Option<String>,

    /// Print intent, plan and executions for every turn.
    #[arg(long)]
    debug: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(long, conflicts_with = "deny")]
    yes: bool,

    /// Answer no to every confirmation prompt.
    #[arg(long)]
    deny: bool,

    /// Run this one request and exit instead of starting the prompt loop.
    prompt: Vec<String>,
}

impl Cli {
    fn config(&self) -> AgentConfig {
        let mut config = AgentConfig::from_env();
        if let Some(root) = &self.workspace {
            config = config.with_workspace(root);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(url) = &self.ollama_url {
            config = config.with_ollama_url(url);
        }
        if self.yes {
            config = config.with_confirm(ConfirmMode::AlwaysYes);
        } else if self.deny {
            config = config.with_confirm(ConfirmMode::AlwaysNo);
        }
        if self.debug {
            config = config.enable_debug();
        }
        config
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = cli.config();
    logging::init(config.debug);

    let mut agent = Agent::from_config(&config).context("start agent")?;

    if !cli.prompt.is_empty() {
        let input = cli.prompt.join(" ");
        print_turn(&agent, &input, config.debug);
        return Ok(());
    }

    println!("{}", "KOV - local agent. Type /help for commands.".cyan().bold());
    println!(
        "{} {}",
        "Workspace:".dimmed(),
        agent.context().tools.workspace().root().display()
    );
    let stdin = io::stdin();
    loop {
        print!("{} ", ">".green().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/help" => print_help(&agent),
            "/clear" => {
                agent = Agent::from_config(&config).context("rebuild agent")?;
                println!("{}", "Session cleared.".dimmed());
            }
            "/debug" => {
                config.debug = !config.debug;
                println!("Debug mode {}", if config.debug { "on" } else { "off" });
            }
            _ => print_turn(&agent, input, config.debug),
        }
    }

    Ok(())
}

fn print_turn(agent: &Agent, input: &str, debug: bool) {
    match agent.run_guarded(input) {
        Ok(report) => {
            if debug {
                print_debug(&report);
            }
            println!("{}", report.response);
        }
        Err(err) => println!("{} {err}", "Error:".red()),
    }
}

fn print_debug(report: &TurnReport) {
    println!("{}", "--- INTENT ---".yellow());
    println!(
        "{} (confidence: {:.2}) {}",
        report.intent.category, report.intent.confidence, report.intent.description
    );
    println!("{}", "--- PLAN ---".yellow());
    println!(
        "{} | Steps: {} | Tools: {:?} | Complexity: {}",
        report.plan.goal,
        report.plan.steps.len(),
        report.plan.tools_needed,
        report.plan.complexity
    );
    println!("{}", "--- EXECUTIONS ---".yellow());
    for execution in &report.executions {
        let status = if execution.success {
            "ok".green()
        } else {
            "failed".red()
        };
        println!("{} {:?} [{status}]", execution.tool_name, execution.parameters);
        if let Some(error) = &execution.error {
            println!("  {}", error.dimmed());
        }
    }
    println!("{} {:?}", "--- TERMINATION ---".yellow(), report.termination);
}

fn print_help(agent: &Agent) {
    println!("{}", "Commands:".bold());
    println!("  /help   show this message");
    println!("  /clear  start a fresh session");
    println!("  /debug  toggle intent and plan output");
    println!("  /quit   leave (also /exit)");
    println!();
    let programs: Vec<&str> = agent.context().tools.shell_gate().allowlist().collect();
    println!("{} {}", "Shell programs:".bold(), programs.join(", "));
    println!();
    println!("{}", "Anything else is sent to the agent, for example:".bold());
    println!("  list files in src");
    println!("  read Cargo.toml");
    println!("  run git status");
    println!("  fetch https://example.com");
}
