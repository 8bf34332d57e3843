use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys of the agent server's `configurable` block.
pub mod keys {
    pub const SYSTEM_MESSAGE: &str = "type==agent/system_message";
    pub const AGENT_TYPE: &str = "type==agent/agent_type";
    pub const RETRIEVAL_DESCRIPTION: &str = "type==agent/retrieval_description";
    pub const TOOLS: &str = "type==agent/tools";
    pub const INTERRUPT_BEFORE_ACTION: &str = "type==agent/interrupt_before_action";
    pub const DESCRIPTION: &str = "type==agent/description";
    pub const TYPE: &str = "type";
}

/// An assistant as returned by `GET /assistants/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub assistant_id: String,
    pub name: String,
    #[serde(default)]
    pub config: AgentConfig,
    #[serde(default)]
    pub public: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub configurable: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentConfig {
    /// The agent's runbook, if the server stored one as a string.
    pub fn runbook(&self) -> Option<&str> {
        self.configurable
            .get(keys::SYSTEM_MESSAGE)
            .and_then(Value::as_str)
    }

    pub fn set_runbook(&mut self, runbook: impl Into<String>) {
        self.configurable
            .insert(keys::SYSTEM_MESSAGE.to_string(), Value::String(runbook.into()));
    }
}

/// Body of `PUT /assistants/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentUpdate {
    pub name: String,
    pub config: AgentConfig,
    pub public: bool,
}

/// Body of `POST /assistants`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgent {
    pub name: String,
    pub config: AgentConfig,
}

/// A thread as listed by `GET /threads/`. Threads may belong to no assistant,
/// and `updated_at` is only parsed for the threads a caller keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub updated_at: Value,
}

impl Thread {
    pub fn belongs_to(&self, assistant_id: &str) -> bool {
        self.assistant_id.as_deref() == Some(assistant_id)
    }

    /// Parsed `updated_at`, `None` when missing or unreadable.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_str().and_then(parse_timestamp)
    }
}

/// RFC 3339 with offset or `Z`; a timestamp without offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Body of `POST /threads`.
#[derive(Debug, Clone, Serialize)]
pub struct NewThread {
    pub name: String,
    pub assistant_id: String,
    pub starting_message: String,
}

/// One checkpoint of `GET /threads/{id}/history`. The server lists them
/// newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadState {
    pub values: ThreadValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadValues {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Human {
        #[serde(default)]
        content: Value,
    },
    Ai {
        #[serde(default)]
        content: Value,
        #[serde(default)]
        tool_calls: Option<Vec<Value>>,
    },
    Tool {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        content: Value,
    },
    #[serde(other)]
    Other,
}

/// An installed action package and its OpenAPI description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionPackage {
    pub name: String,
    pub port: u16,
    pub api_spec: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionPackages {
    pub actions: Vec<ActionPackage>,
}

/// `config.json` of the desktop installation.
#[derive(Debug, Clone, Deserialize)]
pub struct DesktopConfig {
    #[serde(rename = "ActionPackageMapping", default)]
    pub action_package_mapping: Vec<ActionPackageMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionPackageMapping {
    pub name: String,
    pub path: String,
    #[serde(rename = "actionServerPort")]
    pub action_server_port: u16,
}

/// Tool entry stored under `type==agent/tools`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: Value,
}

/// Agent definition from a bundle template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AgentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub model: Value,
    pub system_prompt: String,
    pub retrieval_prompt: String,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Tools in a template are either a bare tool type or a full config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolSpec {
    Named(String),
    Config(Value),
}

/// `tool_names` argument of the deploy action.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRef {
    pub tool_name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployedAgent {
    pub assistant_id: String,
    pub thread_id: String,
}

/// A file attached to an assistant for retrieval.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_keeps_unknown_fields() {
        let agent: Agent = serde_json::from_value(json!({
            "assistant_id": "a1",
            "name": "Helper",
            "public": true,
            "user_id": "u9",
            "config": {
                "configurable": { "type==agent/system_message": "Be kind." },
                "tags": ["x"]
            }
        }))
        .unwrap();

        assert_eq!(agent.config.runbook(), Some("Be kind."));
        assert_eq!(agent.extra.get("user_id"), Some(&json!("u9")));

        let back = serde_json::to_value(&agent.config).unwrap();
        assert_eq!(back["tags"], json!(["x"]));
    }

    #[test]
    fn test_thread_timestamp_accepts_zulu() {
        let thread: Thread = serde_json::from_value(json!({
            "thread_id": "t1",
            "assistant_id": "a1",
            "updated_at": "2024-05-01T10:00:00.123456Z"
        }))
        .unwrap();
        let updated = thread.last_update().unwrap();
        assert_eq!(updated.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");

        let naive = parse_timestamp("2024-05-01T09:00:00").unwrap();
        assert!(naive < updated);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_thread_without_assistant_decodes() {
        let threads: Vec<Thread> = serde_json::from_value(json!([
            {"thread_id": "t0", "assistant_id": null, "name": null, "updated_at": 17},
            {"thread_id": "t1", "assistant_id": "a1", "updated_at": "2024-05-01T10:00:00Z"}
        ]))
        .unwrap();

        assert!(!threads[0].belongs_to("a1"));
        assert!(threads[0].last_update().is_none());
        assert!(threads[1].belongs_to("a1"));
    }

    #[test]
    fn test_null_tool_fields_decode() {
        let msgs: Vec<Message> = serde_json::from_value(json!([
            {"type": "tool", "name": null, "content": "ok"},
            {"type": "ai", "content": "Done.", "tool_calls": null}
        ]))
        .unwrap();
        assert!(matches!(&msgs[0], Message::Tool { name: None, .. }));
        assert!(matches!(&msgs[1], Message::Ai { tool_calls: None, .. }));
    }

    #[test]
    fn test_unknown_message_type_is_other() {
        let msg: Message = serde_json::from_value(json!({"type": "system", "content": "x"})).unwrap();
        assert!(matches!(msg, Message::Other));
    }

    #[test]
    fn test_tool_spec_variants() {
        let tools: Vec<ToolSpec> =
            serde_yaml::from_str("- retrieval\n- type: custom\n  name: Custom\n").unwrap();
        assert!(matches!(&tools[0], ToolSpec::Named(t) if t == "retrieval"));
        assert!(matches!(&tools[1], ToolSpec::Config(_)));
    }
}
