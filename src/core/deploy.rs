use crate::core::{AgentConfig, AgentPlatform, DeployedAgent, FileUpload, NewAgent, NewThread, Storage};
use crate::domain::model::{keys, AgentSpec, ToolConfig, ToolRef, ToolSpec};
use crate::utils::error::{Result, TutorError};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

pub const WELCOME_THREAD_NAME: &str = "Welcome";
pub const WELCOME_MESSAGE: &str = "Hi! How can I help you with today?";

#[derive(Debug, Deserialize)]
struct BundleTemplate {
    #[serde(rename = "s4d-bundle")]
    bundle: Bundle,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(default)]
    agents: Vec<BundleEntry>,
}

#[derive(Debug, Deserialize)]
struct BundleEntry {
    agent: AgentSpec,
}

/// First agent of an `s4d-bundle` template.
pub fn parse_template(yaml: &str) -> Result<AgentSpec> {
    let template: BundleTemplate = serde_yaml::from_str(yaml)?;
    template
        .bundle
        .agents
        .into_iter()
        .next()
        .map(|entry| entry.agent)
        .ok_or_else(|| TutorError::TemplateError {
            message: "s4d-bundle.agents is empty".to_string(),
        })
}

pub async fn load_template<S: Storage>(storage: &S, path: &str) -> Result<AgentSpec> {
    tracing::info!("📁 Loading agent bundle template: {}", path);
    let raw = storage.read_file(path).await?;
    let yaml = String::from_utf8(raw).map_err(|e| TutorError::TemplateError {
        message: format!("{} is not valid UTF-8: {}", path, e),
    })?;
    parse_template(&yaml)
}

/// Tool entry pointing the agent at an action server on localhost.
pub fn action_server_tool(action_name: &str, port: u16) -> ToolConfig {
    ToolConfig {
        tool_type: "action_server_by_sema4ai".to_string(),
        name: "Action Server by Sema4.ai".to_string(),
        description: Some(
            "Run AI actions with [Sema4.ai Action Server](https://github.com/Sema4AI/actions)."
                .to_string(),
        ),
        config: json!({
            "url": format!("http://localhost:{}", port),
            "api_key": "APIKEY",
            "name": action_name,
            "isBundled": "false",
        }),
    }
}

/// Parses the `[{"tool_name": ..., "port": <int>}]` argument of the deploy action.
pub fn parse_tool_refs(tool_names: &str) -> Result<Vec<ToolRef>> {
    serde_json::from_str(tool_names).map_err(|e| TutorError::InvalidConfigValueError {
        field: "tool_names".to_string(),
        value: tool_names.to_string(),
        reason: format!(
            "Expected a JSON list of {{\"tool_name\": string, \"port\": integer}}: {}",
            e
        ),
    })
}

/// Same casing rules as Python's `str.title()`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    out
}

fn tool_value(tool: &ToolSpec) -> Value {
    match tool {
        ToolSpec::Config(config) => config.clone(),
        ToolSpec::Named(tool_type) => {
            let name = title_case(tool_type);
            json!({ "config": { "name": name }, "type": tool_type, "name": name })
        }
    }
}

/// Guesses the upload content type from the file extension. Markdown is sent
/// as plain text so the ingest pipeline accepts it.
pub fn mime_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("md") | Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Builds the agent server's `configurable` block for a new agent.
pub fn build_agent_config(
    spec: &AgentSpec,
    system_prompt: &str,
    retrieval_prompt: &str,
) -> AgentConfig {
    let tools: Vec<Value> = spec.tools.iter().map(tool_value).collect();

    let mut configurable = Map::new();
    configurable.insert(keys::RETRIEVAL_DESCRIPTION.to_string(), json!(retrieval_prompt));
    configurable.insert(keys::AGENT_TYPE.to_string(), spec.model.clone());
    configurable.insert(keys::SYSTEM_MESSAGE.to_string(), json!(system_prompt));
    configurable.insert(keys::TOOLS.to_string(), Value::Array(tools));
    configurable.insert(keys::TYPE.to_string(), json!("agent"));
    configurable.insert(keys::INTERRUPT_BEFORE_ACTION.to_string(), json!(false));
    configurable.insert(keys::DESCRIPTION.to_string(), json!(spec.description));

    AgentConfig {
        configurable,
        extra: Map::new(),
    }
}

/// Creates agents on the agent server from bundle definitions.
pub struct AgentDeployer<'a, S: Storage, P: AgentPlatform + ?Sized> {
    storage: &'a S,
    platform: &'a P,
}

impl<'a, S: Storage, P: AgentPlatform + ?Sized> AgentDeployer<'a, S, P> {
    pub fn new(storage: &'a S, platform: &'a P) -> Self {
        Self { storage, platform }
    }

    /// Template agent with the caller's name, description, runbook and
    /// action-server tools.
    pub async fn deploy_to_desktop(
        &self,
        template_path: &str,
        name: &str,
        description: &str,
        system_prompt: &str,
        tool_names: &str,
    ) -> Result<DeployedAgent> {
        let tool_refs = parse_tool_refs(tool_names)?;

        let mut spec = load_template(self.storage, template_path).await?;
        spec.name = name.to_string();
        spec.description = description.to_string();
        spec.system_prompt = system_prompt.to_string();
        spec.tools = tool_refs
            .iter()
            .map(|tool| {
                serde_json::to_value(action_server_tool(&tool.tool_name, tool.port))
                    .map(ToolSpec::Config)
            })
            .collect::<std::result::Result<_, _>>()?;

        self.deploy(&spec).await
    }

    /// Creates the assistant, uploads its retrieval files and opens a
    /// welcome thread.
    pub async fn deploy(&self, spec: &AgentSpec) -> Result<DeployedAgent> {
        tracing::info!("🚀 Deploying agent: {}", spec.name);

        // 找不到檔案時，system prompt 本身就是 runbook 文字
        let system_prompt = match self.storage.read_file(&spec.system_prompt).await {
            Ok(bytes) => {
                tracing::debug!("Loaded runbook from file: {}", spec.system_prompt);
                String::from_utf8(bytes).map_err(|e| {
                    TutorError::validation(format!(
                        "Runbook file {} is not valid UTF-8: {}",
                        spec.system_prompt, e
                    ))
                })?
            }
            Err(_) => spec.system_prompt.clone(),
        };

        tracing::debug!("Loading retrieval prompt: {}", spec.retrieval_prompt);
        let retrieval_prompt = self.storage.read_file(&spec.retrieval_prompt).await?;
        let retrieval_prompt =
            String::from_utf8(retrieval_prompt).map_err(|e| TutorError::TemplateError {
                message: format!(
                    "Retrieval prompt {} is not valid UTF-8: {}",
                    spec.retrieval_prompt, e
                ),
            })?;

        let new_agent = NewAgent {
            name: spec.name.clone(),
            config: build_agent_config(spec, &system_prompt, &retrieval_prompt),
        };
        let assistant = self.platform.create_agent(&new_agent).await?;
        let assistant_id = assistant.assistant_id;
        tracing::info!("✅ Created assistant {}", assistant_id);

        for file_path in &spec.files {
            let filename = Path::new(file_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(file_path)
                .to_string();
            tracing::info!("📤 Uploading file: {}", filename);

            let data = self.storage.read_file(file_path).await?;
            self.platform
                .ingest_file(
                    &assistant_id,
                    FileUpload {
                        filename,
                        mime_type: mime_type_for(file_path).to_string(),
                        data,
                    },
                )
                .await?;
        }

        let thread_id = self
            .platform
            .create_thread(&NewThread {
                name: WELCOME_THREAD_NAME.to_string(),
                assistant_id: assistant_id.clone(),
                starting_message: WELCOME_MESSAGE.to_string(),
            })
            .await?;

        Ok(DeployedAgent {
            assistant_id,
            thread_id,
        })
    }
}
