//! Profile Tool - structured input with nested types

use crate::mcp::McpToolResult;
use crate::server::tool::{parse_input, ServerTool};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use toolrelay_foundation::Result;

#[derive(Debug, Deserialize)]
struct ProfileInput {
    name: String,
    age: i64,
    skills: Vec<String>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

pub struct ProfileTool;

impl ProfileTool {
    pub const NAME: &'static str = "advanced";
}

#[async_trait]
impl ServerTool for ProfileTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some(
            "Advanced tool demonstrating complex type hints.\n\n\
             name: Person's name\n\
             age: Person's age in years\n\
             skills: List of skills the person has\n\
             metadata: Optional additional metadata dictionary",
        )
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Person's name"},
                "age": {"type": "integer", "description": "Person's age in years"},
                "skills": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "List of skills the person has"
                },
                "metadata": {
                    "type": "object",
                    "description": "Optional additional metadata dictionary"
                }
            },
            "required": ["name", "age", "skills"]
        })
    }

    async fn execute(&self, input: Value) -> Result<McpToolResult> {
        let input: ProfileInput = parse_input(Self::NAME, input)?;

        let mut profile = json!({
            "name": input.name,
            "age": input.age,
            "skill_count": input.skills.len(),
            "skills": input.skills,
        });

        // Empty metadata is dropped
        if let Some(metadata) = input.metadata.filter(|m| !m.is_empty()) {
            profile["metadata"] = Value::Object(metadata);
        }

        let pretty = serde_json::to_string_pretty(&profile)?;
        Ok(McpToolResult::text(format!("Person Profile: {}", pretty)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::McpContent;

    async fn run(input: Value) -> Value {
        let result = ProfileTool.execute(input).await.unwrap();
        let McpContent::Text { text } = &result.content[0];
        serde_json::from_str(text.strip_prefix("Person Profile: ").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_profile() {
        let profile = run(json!({
            "name": "Ada",
            "age": 36,
            "skills": ["math", "engines"],
            "metadata": {"team": "analytical"}
        }))
        .await;

        assert_eq!(profile["skill_count"], 2);
        assert_eq!(profile["metadata"]["team"], "analytical");
    }

    #[tokio::test]
    async fn test_empty_metadata_omitted() {
        let profile = run(json!({"name": "Ada", "age": 36, "skills": [], "metadata": {}})).await;
        assert!(profile.get("metadata").is_none());
        assert_eq!(profile["skill_count"], 0);
    }
}
