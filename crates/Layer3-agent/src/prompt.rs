//! System prompt rendering

use std::collections::BTreeMap;
use toolrelay_core::McpTool;
use toolrelay_foundation::TOOLS_PLACEHOLDER;
use toolrelay_provider::ToolDef;

/// Markdown listing of the tools, in name order
pub fn tools_markdown(tools: &BTreeMap<String, McpTool>) -> String {
    let mut lines = vec!["\n## MCP Server Tools\n".to_string()];

    for tool in tools.values() {
        lines.push(format!("### `{}`", tool.name));

        if !tool.description.is_empty() {
            lines.push(tool.description.clone());
        }

        if has_schema(&tool.input_schema) {
            lines.push("**Input schema:**".to_string());
            lines.push("```json".to_string());
            lines.push(
                serde_json::to_string_pretty(&tool.input_schema)
                    .unwrap_or_else(|_| tool.input_schema.to_string()),
            );
            lines.push("```".to_string());
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

fn has_schema(schema: &serde_json::Value) -> bool {
    match schema {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Fill the tools placeholder of `template`
///
/// With native tool calling the model gets descriptors separately, so the
/// placeholder is just removed.
pub fn render_system_prompt(
    template: &str,
    tools: &BTreeMap<String, McpTool>,
    use_llm_tools: bool,
) -> String {
    if use_llm_tools {
        template.replace(TOOLS_PLACEHOLDER, "")
    } else {
        template.replace(TOOLS_PLACEHOLDER, &tools_markdown(tools))
    }
}

/// Descriptors for native tool calling
pub fn native_tool_defs(tools: &BTreeMap<String, McpTool>) -> Vec<ToolDef> {
    tools
        .values()
        .map(|t| ToolDef::new(&t.name, &t.description, t.input_schema.clone()))
        .collect()
}
