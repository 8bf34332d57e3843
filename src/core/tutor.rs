use crate::core::catalog::ActionCatalog;
use crate::core::deploy::AgentDeployer;
use crate::core::{runbook, threads};
use crate::core::{ActionPackages, AgentPlatform, ConfigProvider, DeployedAgent, Storage};
use crate::utils::error::{Result, TutorError};
use crate::utils::validation::validate_resource_id;
use serde::Deserialize;

/// The action surface the tutor's model calls into.
pub struct RunbookTutor<P: AgentPlatform, S: Storage + Clone, C: ConfigProvider> {
    platform: P,
    storage: S,
    config: C,
}

impl<P: AgentPlatform, S: Storage + Clone, C: ConfigProvider> RunbookTutor<P, S, C> {
    pub fn new(platform: P, storage: S, config: C) -> Self {
        Self {
            platform,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn get_all_agents(&self) -> Result<String> {
        runbook::list_agents(&self.platform).await
    }

    pub async fn get_agent_runbook(&self, assistant_id: &str) -> Result<String> {
        if let Err(e) = validate_resource_id("assistant_id", assistant_id) {
            tracing::warn!("Runbook lookup skipped: {}", e);
            return Ok(runbook::RUNBOOK_NOT_FOUND.to_string());
        }
        Ok(runbook::get_runbook(&self.platform, assistant_id).await)
    }

    pub async fn update_agent_runbook(&self, assistant_id: &str, new_runbook: &str) -> Result<String> {
        validate_resource_id("assistant_id", assistant_id)?;
        runbook::update_runbook(&self.platform, assistant_id, new_runbook).await
    }

    pub async fn get_latest_thread(&self, assistant_id: &str) -> Result<String> {
        validate_resource_id("assistant_id", assistant_id)?;
        threads::latest_thread_summary(&self.platform, assistant_id).await
    }

    /// Installed action packages. `internal_actions` replaces the configured
    /// exclusion list when given.
    pub async fn get_actions(&self, internal_actions: Option<&[String]>) -> Result<ActionPackages> {
        let desktop_home = self
            .config
            .desktop_home()
            .ok_or_else(|| TutorError::MissingConfigError {
                field: "desktop_home (or ROBOCORP_HOME)".to_string(),
            })?;

        let internal = internal_actions.unwrap_or_else(|| self.config.internal_actions());
        ActionCatalog::new(self.storage.clone(), desktop_home)
            .get_actions(internal)
            .await
    }

    pub async fn deploy_agent_to_desktop(
        &self,
        name: &str,
        description: &str,
        system_prompt: &str,
        tool_names: &str,
    ) -> Result<DeployedAgent> {
        AgentDeployer::new(&self.storage, &self.platform)
            .deploy_to_desktop(
                self.config.template_path(),
                name,
                description,
                system_prompt,
                tool_names,
            )
            .await
    }

    /// Runs a tool call from the model. `arguments` is the raw JSON object
    /// the model produced; unknown tools are reported back as text.
    pub async fn handle_tool_call(&self, name: &str, arguments: &str) -> Result<String> {
        tracing::debug!("🔧 Tool call: {} {}", name, arguments);
        let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };

        match name {
            "get_all_agents" => self.get_all_agents().await,
            "get_agent_runbook" => {
                let args: AssistantArgs = serde_json::from_str(arguments)?;
                self.get_agent_runbook(&args.assistant_id).await
            }
            "get_latest_thread" => {
                let args: AssistantArgs = serde_json::from_str(arguments)?;
                self.get_latest_thread(&args.assistant_id).await
            }
            "update_agent_runbook" => {
                let args: UpdateArgs = serde_json::from_str(arguments)?;
                self.update_agent_runbook(&args.assistant_id, &args.new_runbook)
                    .await
            }
            "get_actions" => {
                let args: ActionsArgs = serde_json::from_str(arguments)?;
                let names = args.internal_actions.map(|internal| internal.names);
                let packages = self.get_actions(names.as_deref()).await?;
                Ok(serde_json::to_string(&packages)?)
            }
            "deploy_agent_to_desktop" => {
                let args: DeployArgs = serde_json::from_str(arguments)?;
                let deployed = self
                    .deploy_agent_to_desktop(
                        &args.name,
                        &args.description,
                        &args.system_prompt,
                        &args.tool_names,
                    )
                    .await?;
                Ok(serde_json::to_string(&deployed)?)
            }
            other => Ok(format!("ERROR: Unknown tool '{}'", other)),
        }
    }
}

#[derive(Deserialize)]
struct AssistantArgs {
    assistant_id: String,
}

#[derive(Deserialize)]
struct UpdateArgs {
    assistant_id: String,
    new_runbook: String,
}

#[derive(Deserialize)]
struct InternalActions {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct ActionsArgs {
    #[serde(default)]
    internal_actions: Option<InternalActions>,
}

#[derive(Deserialize)]
struct DeployArgs {
    name: String,
    description: String,
    system_prompt: String,
    #[serde(default = "empty_tool_list")]
    tool_names: String,
}

fn empty_tool_list() -> String {
    "[]".to_string()
}
