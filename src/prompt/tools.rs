//! OpenAI function-tool definitions for the tutor's actions.

use serde_json::{json, Value};

fn function(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required
            }
        }
    })
}

/// All tools, in the order they appear in the prompt.
pub fn tool_definitions() -> Vec<Value> {
    let assistant_id = json!({
        "type": "string",
        "description": "Id of the assistant."
    });

    vec![
        function(
            "get_all_agents",
            "Gets all agent ids available. Returns the list of agent names and their ids.",
            json!({}),
            &[],
        ),
        function(
            "get_agent_runbook",
            "Gets the runbook (system prompt) of an agent.",
            json!({ "assistant_id": assistant_id }),
            &["assistant_id"],
        ),
        function(
            "get_latest_thread",
            "Gets a summary of the latest thread of an agent.",
            json!({ "assistant_id": assistant_id }),
            &["assistant_id"],
        ),
        function(
            "update_agent_runbook",
            "Updates the runbook of an existing agent.",
            json!({
                "assistant_id": assistant_id,
                "new_runbook": {
                    "type": "string",
                    "description": "The new runbook. Include the COMPLETE runbook, not just the updated parts."
                }
            }),
            &["assistant_id", "new_runbook"],
        ),
        function(
            "get_actions",
            "Retrieve the action packages available on the desktop action servers, with their ports and full API specification.",
            json!({
                "internal_actions": {
                    "type": "object",
                    "properties": {
                        "names": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "The names of the internal actions."
                        }
                    },
                    "description": "Action packages to exclude from the result."
                }
            }),
            &[],
        ),
        function(
            "deploy_agent_to_desktop",
            "Deploys an agent to desktop that will use the provided system prompt as its runbook.",
            json!({
                "name": { "type": "string", "description": "The name of the agent to deploy." },
                "description": { "type": "string", "description": "The description of the agent to deploy." },
                "system_prompt": { "type": "string", "description": "The system prompt to use for the agent." },
                "tool_names": {
                    "type": "string",
                    "description": "JSON list of {\"tool_name\": string, \"port\": integer}. The port MUST come from get_actions."
                }
            }),
            &["name", "description", "system_prompt", "tool_names"],
        ),
    ]
}

pub fn tool_names() -> Vec<String> {
    tool_definitions()
        .iter()
        .filter_map(|tool| tool["function"]["name"].as_str().map(str::to_string))
        .collect()
}
