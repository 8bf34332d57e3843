use crate::core::{
    Agent, AgentPlatform, AgentUpdate, FileUpload, NewAgent, NewThread, Thread, ThreadState,
};
use crate::utils::error::{Result, TutorError};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_AGENT_SERVER_URL: &str = "http://127.0.0.1:8100";

/// reqwest client for the agent server's `/assistants`, `/threads` and
/// `/ingest` endpoints.
#[derive(Debug, Clone)]
pub struct AgentServerClient {
    base_url: String,
    client: Client,
}

impl AgentServerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("📡 {} -> {}", endpoint, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::HttpStatusError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(path, response).await
    }
}

#[async_trait::async_trait]
impl AgentPlatform for AgentServerClient {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_json("/assistants/").await
    }

    async fn get_agent(&self, assistant_id: &str) -> Result<Agent> {
        self.get_json(&format!("/assistants/{}", assistant_id)).await
    }

    async fn update_agent(&self, assistant_id: &str, update: &AgentUpdate) -> Result<(u16, String)> {
        let path = format!("/assistants/{}", assistant_id);
        let response = self.client.put(self.url(&path)).json(update).send().await?;
        let status = response.status().as_u16();
        tracing::debug!("📡 PUT {} -> {}", path, status);
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent> {
        let response = self
            .client
            .post(self.url("/assistants"))
            .json(agent)
            .send()
            .await?;
        Self::decode("/assistants", response).await
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        self.get_json("/threads/").await
    }

    async fn thread_history(&self, thread_id: &str) -> Result<Vec<ThreadState>> {
        self.get_json(&format!("/threads/{}/history", thread_id)).await
    }

    async fn create_thread(&self, thread: &NewThread) -> Result<String> {
        let response = self
            .client
            .post(self.url("/threads"))
            .json(thread)
            .send()
            .await?;
        let created: serde_json::Value = Self::decode("/threads", response).await?;

        created
            .get("thread_id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| TutorError::validation("Thread response has no thread_id"))
    }

    async fn ingest_file(&self, assistant_id: &str, file: FileUpload) -> Result<()> {
        // 檔案只能掛在 assistant 或 thread 其中之一
        let config = json!({ "configurable": { "assistant_id": assistant_id } });

        let part = multipart::Part::bytes(file.data)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)?;
        let form = multipart::Form::new()
            .part("files", part)
            .text("config", config.to_string());

        let response = self
            .client
            .post(self.url("/ingest"))
            .header("accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("📡 /ingest {} -> {} {}", file.filename, status, body);

        if !status.is_success() {
            return Err(TutorError::HttpStatusError {
                endpoint: "/ingest".to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
