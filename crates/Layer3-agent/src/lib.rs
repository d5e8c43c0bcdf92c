//! # toolrelay-agent
//!
//! Model-driven tool loop on top of `toolrelay-core` and `toolrelay-provider`.
//!
//! ## Loop
//!
//! 1. Send the prompt (or the last observation) to the model
//! 2. Look for a single `Action: <tool>: <json>` line in the reply
//! 3. No action: stop. Otherwise run the tool and feed back
//!    `Observation: <text>` as the next prompt
//! 4. Stop after `max_turns` model calls at most
//!
//! The toolbox is cleaned up exactly once per run, on every exit path.
//!
//! ## Example
//!
//! ```ignore
//! use toolrelay_agent::{Agent, McpToolbox};
//!
//! let toolbox = Arc::new(McpToolbox::connect(&server_config).await?);
//! let mut agent = Agent::new(provider, toolbox).with_max_turns(5);
//! let outcome = agent.run("What is 6 * 7?").await?;
//! ```

pub mod action;
pub mod agent;
pub mod history;
pub mod prompt;
pub mod toolbox;

pub use action::{Action, ActionParser};
pub use agent::{Agent, AgentEvent, AgentOutcome, StopReason};
pub use history::MessageHistory;
pub use prompt::{native_tool_defs, render_system_prompt, tools_markdown};
pub use toolbox::{LocalToolbox, McpToolbox, Toolbox};
