//! Console rendering of agent events

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use toolrelay_agent::{AgentEvent, StopReason};
use tracing::warn;

/// Console lines for one event
pub fn render_event(event: &AgentEvent) -> Vec<String> {
    match event {
        AgentEvent::ModelReply { text, .. } => text
            .split('\n')
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| format!("[ASSISTANT(line {})] {}", i, line.trim()))
            .collect(),
        AgentEvent::Action { tool, input } => {
            vec![format!("[SYSTEM] Action: {}, Input: {}", tool, input)]
        }
        AgentEvent::Observation { text, .. } => vec![format!("[SYSTEM] Tool result: {}", text)],
        AgentEvent::UnknownTool { text, .. } => vec![format!("[SYSTEM] {}", text)],
        AgentEvent::Done {
            turns,
            stop: StopReason::TurnsExhausted,
        } => vec![format!("[SYSTEM] Stopped after {} turns", turns)],
        AgentEvent::Done { .. } => vec![],
    }
}

/// Print events until the sender side is dropped
pub async fn print_events(mut rx: mpsc::Receiver<AgentEvent>) {
    while let Some(event) = rx.recv().await {
        for line in render_event(&event) {
            println!("{}", line);
        }
    }
}

/// Wait for the printer task; a panic in it is logged, not propagated
///
/// Returns whether the printer ran to completion.
pub async fn finish_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Event printer failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_lines_numbered_and_trimmed() {
        let lines = render_event(&AgentEvent::ModelReply {
            turn: 1,
            text: "Thought: hm\n\n  Action: echo: {}  ".to_string(),
        });
        assert_eq!(
            lines,
            vec![
                "[ASSISTANT(line 0)] Thought: hm".to_string(),
                "[ASSISTANT(line 2)] Action: echo: {}".to_string(),
            ]
        );
    }

    #[test]
    fn test_system_lines() {
        assert_eq!(
            render_event(&AgentEvent::Action {
                tool: "Echo".to_string(),
                input: "{}".to_string(),
            }),
            vec!["[SYSTEM] Action: Echo, Input: {}".to_string()]
        );
        assert_eq!(
            render_event(&AgentEvent::Observation {
                tool: "echo".to_string(),
                text: "Echo: hi".to_string(),
            }),
            vec!["[SYSTEM] Tool result: Echo: hi".to_string()]
        );
        assert!(render_event(&AgentEvent::Done {
            turns: 1,
            stop: StopReason::NoAction,
        })
        .is_empty());
    }

    #[tokio::test]
    async fn test_finish_printer_drains_events() {
        let (tx, rx) = mpsc::channel(4);
        let printer = tokio::spawn(print_events(rx));
        tx.send(AgentEvent::Done {
            turns: 1,
            stop: StopReason::NoAction,
        })
        .await
        .unwrap();
        drop(tx);

        assert!(finish_printer(printer).await);
    }

    #[tokio::test]
    async fn test_finish_printer_reports_panic() {
        let printer = tokio::spawn(async { panic!("printer blew up") });
        assert!(!finish_printer(printer).await);
    }
}
