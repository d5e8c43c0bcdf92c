//! Action parsing - pulls one tool call out of free-text model output
//!
//! Only single-line actions of the exact form `Action: <word>: <rest>` are
//! recognized. The first matching line wins; later ones are ignored.

use regex::Regex;

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Tool name as written by the model
    pub tool: String,

    /// Everything after the second `: ` on that line, untouched
    pub input: String,
}

/// Parser for `Action: <tool>: <input>` lines
#[derive(Debug, Clone)]
pub struct ActionParser {
    pattern: Regex,
}

impl Default for ActionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^Action: (\w+): (.*)$").expect("valid regex"),
        }
    }

    /// First action in `text`, if any
    pub fn parse(&self, text: &str) -> Option<Action> {
        text.split('\n').find_map(|line| {
            self.pattern.captures(line).map(|caps| Action {
                tool: caps[1].to_string(),
                input: caps[2].to_string(),
            })
        })
    }
}
