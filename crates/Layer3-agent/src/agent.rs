//! Core agent implementation

use crate::action::ActionParser;
use crate::history::MessageHistory;
use crate::toolbox::Toolbox;
use std::sync::Arc;
use tokio::sync::mpsc;
use toolrelay_foundation::{Error, Result, DEFAULT_MAX_TURNS};
use toolrelay_provider::{Provider, ToolDef};
use tracing::{debug, info, warn};

/// Events emitted by the agent during execution
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// Reply text from the model
    ModelReply { turn: usize, text: String },

    /// Action found in the reply
    Action { tool: String, input: String },

    /// Tool result fed back to the model
    Observation { tool: String, text: String },

    /// The model asked for a tool that does not exist
    UnknownTool { tool: String, text: String },

    /// Loop finished
    Done { turns: usize, stop: StopReason },
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model replied without an action
    NoAction,

    /// Every turn requested a tool
    TurnsExhausted,
}

/// Result of one run
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Model calls made
    pub turns: usize,

    pub stop: StopReason,

    /// Last model reply, if any call was made
    pub last_reply: Option<String>,
}

/// ReAct-style agent: model reply, action, observation, repeat
pub struct Agent {
    provider: Arc<dyn Provider>,

    toolbox: Arc<dyn Toolbox>,

    parser: ActionParser,

    history: MessageHistory,

    /// Maximum model calls per run
    max_turns: usize,

    /// Passed to the provider when tools are described natively
    native_tools: Vec<ToolDef>,

    events: Option<mpsc::Sender<AgentEvent>>,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>, toolbox: Arc<dyn Toolbox>) -> Self {
        Self {
            provider,
            toolbox,
            parser: ActionParser::new(),
            history: MessageHistory::new(),
            max_turns: DEFAULT_MAX_TURNS,
            native_tools: Vec::new(),
            events: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.history.set_system_prompt(prompt);
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_native_tools(mut self, tools: Vec<ToolDef>) -> Self {
        self.native_tools = tools;
        self
    }

    pub fn with_events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    /// Run the loop for `prompt`
    ///
    /// The toolbox is cleaned up before this returns, whether the loop
    /// finished or failed.
    pub async fn run(&mut self, prompt: &str) -> Result<AgentOutcome> {
        let result = self.run_turns(prompt).await;
        let cleanup = self.toolbox.cleanup().await;

        match (result, cleanup) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!("Cleanup failed: {}", cleanup_err);
                Err(e)
            }
        }
    }

    async fn run_turns(&mut self, prompt: &str) -> Result<AgentOutcome> {
        let mut next_prompt = prompt.to_string();
        let mut last_reply = None;

        for turn in 1..=self.max_turns {
            info!("Turn {}/{}", turn, self.max_turns);

            self.history.add_user(next_prompt.as_str());
            let reply = self
                .provider
                .complete(
                    self.history.system_prompt(),
                    self.history.messages(),
                    &self.native_tools,
                )
                .await
                .map_err(Error::from)?;
            self.history.add_assistant(reply.as_str());

            self.emit(AgentEvent::ModelReply {
                turn,
                text: reply.clone(),
            })
            .await;

            let Some(action) = self.parser.parse(&reply) else {
                debug!("No action in reply, stopping");
                return Ok(self
                    .finish(turn, StopReason::NoAction, Some(reply))
                    .await);
            };

            self.emit(AgentEvent::Action {
                tool: action.tool.clone(),
                input: action.input.clone(),
            })
            .await;

            let tool = action.tool.trim().to_ascii_lowercase();
            let observation = if self.toolbox.contains(&tool).await {
                debug!("Running {} with {}", tool, action.input.trim());
                let text = self.toolbox.invoke(&tool, action.input.trim()).await;
                self.emit(AgentEvent::Observation {
                    tool: tool.clone(),
                    text: text.clone(),
                })
                .await;
                text
            } else {
                let names: Vec<String> =
                    self.toolbox.available_tools().await.into_keys().collect();
                let text = format!(
                    "Unknown tool \"{}\". Available tools: {:?}",
                    action.tool, names
                );
                warn!("{}", text);
                self.emit(AgentEvent::UnknownTool {
                    tool: action.tool.clone(),
                    text: text.clone(),
                })
                .await;
                text
            };

            next_prompt = format!("Observation: {}", observation);
            last_reply = Some(reply);
        }

        warn!("Max turns reached");
        Ok(self
            .finish(self.max_turns, StopReason::TurnsExhausted, last_reply)
            .await)
    }

    async fn finish(
        &self,
        turns: usize,
        stop: StopReason,
        last_reply: Option<String>,
    ) -> AgentOutcome {
        self.emit(AgentEvent::Done { turns, stop }).await;
        AgentOutcome {
            turns,
            stop,
            last_reply,
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Some(ref tx) = self.events {
            let _ = tx.send(event).await;
        }
    }
}
