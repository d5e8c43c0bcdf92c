//! toolrelay - drive a model against a tool server

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use toolrelay_agent::{
    native_tool_defs, render_system_prompt, tools_markdown, Agent, McpToolbox, Toolbox,
};
use toolrelay_cli::{logging, output, provider::build_provider};
use toolrelay_foundation::{AgentConfig, ConfigLoader, ProviderKind};
use toolrelay_provider::Provider;
use tracing::{info, warn};

/// Server launched when neither the config nor `--server` names one
const DEFAULT_SERVER_COMMAND: &str = "toolrelay-server";

/// ToolRelay - let a model call the tools of an MCP-style server
#[derive(Parser, Debug)]
#[command(name = "toolrelay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file layered over the discovered ones
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tool server executable (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Argument for the tool server; repeat for several
    #[arg(long = "server-arg")]
    server_args: Vec<String>,

    /// Prompt to run; read from stdin when absent
    #[arg(short, long)]
    prompt: Option<String>,

    /// Maximum model calls
    #[arg(long)]
    max_turns: Option<usize>,

    /// Model to use (the deployment name for azure)
    #[arg(long)]
    model: Option<String>,

    /// Completion API: anthropic, openai or azure
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Print the server's tools and exit
    #[arg(long)]
    list_tools: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Command-line values over file values
    fn apply(&self, mut config: AgentConfig) -> AgentConfig {
        if let Some(ref server) = self.server {
            config.server.command = Some(server.clone());
        }
        if !self.server_args.is_empty() {
            config.server.args = self.server_args.clone();
        }
        if config.server.command.is_none() {
            config.server.command = Some(DEFAULT_SERVER_COMMAND.to_string());
        }
        if let Some(max_turns) = self.max_turns {
            config.max_turns = Some(max_turns);
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(provider) = self.provider {
            config.provider = Some(provider);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = ConfigLoader::new(&cwd)
        .load_with(args.config.as_deref())
        .context("failed to load configuration")?;
    let config = args.apply(config);
    config.server.validate()?;

    let template = config.system_prompt_text()?;

    let toolbox = Arc::new(
        McpToolbox::connect(&config.server)
            .await
            .context("failed to connect to tool server")?,
    );
    let tools = toolbox.available_tools().await;
    println!(
        "[SYSTEM] Connected to MCP server with tools: {:?}",
        tools.keys().collect::<Vec<_>>()
    );

    if args.list_tools {
        println!("{}", tools_markdown(&tools));
        toolbox.cleanup().await?;
        return Ok(());
    }

    // Nothing below may return before the agent runs, which owns cleanup
    let prepared = prepare(&args, &config).await;
    let (prompt, provider) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            if let Err(cleanup_err) = toolbox.cleanup().await {
                warn!("Cleanup failed: {}", cleanup_err);
            }
            return Err(e);
        }
    };

    let use_llm_tools = config.use_llm_tools();
    let mut agent = Agent::new(provider, toolbox.clone())
        .with_system_prompt(render_system_prompt(&template, &tools, use_llm_tools))
        .with_max_turns(config.max_turns());
    if use_llm_tools {
        agent = agent.with_native_tools(native_tool_defs(&tools));
    }

    let (tx, rx) = mpsc::channel(100);
    let printer = tokio::spawn(output::print_events(rx));
    let result = agent.with_events(tx).run(&prompt).await;
    // Sender went away with the agent; drain what is left
    output::finish_printer(printer).await;

    let outcome = result?;
    info!("Finished after {} turns ({:?})", outcome.turns, outcome.stop);
    Ok(())
}

/// Prompt text and model client
async fn prepare(
    args: &Args,
    config: &AgentConfig,
) -> anyhow::Result<(String, Arc<dyn Provider>)> {
    let prompt = match args.prompt {
        Some(ref prompt) => prompt.clone(),
        None => read_prompt().await?,
    };

    let api_key = config.api_key()?;
    let provider = build_provider(config, api_key)?;

    Ok((prompt, provider))
}

/// One line from stdin after a `[USER]: ` marker
async fn read_prompt() -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"[USER]: ").await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    lines
        .next_line()
        .await
        .context("failed to read prompt")?
        .context("no prompt given on stdin")
}
