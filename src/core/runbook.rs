use crate::core::{AgentPlatform, AgentUpdate};
use crate::utils::error::{Result, TutorError};

pub const RUNBOOK_NOT_FOUND: &str = "Did not find the runbook";
pub const UPDATE_SUCCEEDED: &str = "Successfully updated!";

/// `Name: {name}, ID: {id}` per agent, in the order the server returns them.
pub async fn list_agents<P: AgentPlatform + ?Sized>(platform: &P) -> Result<String> {
    let agents = platform.list_agents().await?;
    tracing::debug!("Found {} agents", agents.len());

    let agent_info: String = agents
        .iter()
        .map(|agent| format!("Name: {}, ID: {}\n", agent.name, agent.assistant_id))
        .collect();

    Ok(format!("Available agents are:\n{}", agent_info))
}

/// Any failure to reach the agent or read its system message yields
/// [`RUNBOOK_NOT_FOUND`] so the model can carry on the conversation.
pub async fn get_runbook<P: AgentPlatform + ?Sized>(platform: &P, assistant_id: &str) -> String {
    match platform.get_agent(assistant_id).await {
        Ok(agent) => match agent.config.runbook() {
            Some(runbook) => runbook.to_string(),
            None => {
                tracing::warn!("Assistant {} has no system message", assistant_id);
                RUNBOOK_NOT_FOUND.to_string()
            }
        },
        Err(e) => {
            tracing::warn!("Could not fetch assistant {}: {}", assistant_id, e);
            RUNBOOK_NOT_FOUND.to_string()
        }
    }
}

/// Replaces the agent's system message with `new_runbook`, keeping the rest
/// of its configuration. A rejected PUT is reported in the returned text.
pub async fn update_runbook<P: AgentPlatform + ?Sized>(
    platform: &P,
    assistant_id: &str,
    new_runbook: &str,
) -> Result<String> {
    if new_runbook.trim().is_empty() {
        return Err(TutorError::validation(
            "The new runbook is empty; pass the complete runbook text",
        ));
    }

    let agent = platform.get_agent(assistant_id).await?;
    let mut config = agent.config;
    config.set_runbook(new_runbook);

    let update = AgentUpdate {
        name: agent.name,
        config,
        public: agent.public,
    };

    let (status, body) = platform.update_agent(assistant_id, &update).await?;
    if status == 200 {
        tracing::info!("✅ Runbook of {} updated", assistant_id);
        Ok(UPDATE_SUCCEEDED.to_string())
    } else {
        tracing::warn!("Runbook update of {} failed with {}", assistant_id, status);
        Ok(format!(
            "Failed with status code: {}, message is {}",
            status, body
        ))
    }
}
