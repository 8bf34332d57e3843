use crate::domain::model::{
    Agent, AgentUpdate, FileUpload, NewAgent, NewThread, Thread, ThreadState,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn agent_server_url(&self) -> &str;
    fn desktop_home(&self) -> Option<&str>;
    fn template_path(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn internal_actions(&self) -> &[String];
}

/// REST surface of the hosted agent server.
#[async_trait]
pub trait AgentPlatform: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<Agent>>;
    async fn get_agent(&self, assistant_id: &str) -> Result<Agent>;
    /// Returns the HTTP status and raw body; a non-2xx answer is not an error here.
    async fn update_agent(&self, assistant_id: &str, update: &AgentUpdate) -> Result<(u16, String)>;
    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent>;
    async fn list_threads(&self) -> Result<Vec<Thread>>;
    async fn thread_history(&self, thread_id: &str) -> Result<Vec<ThreadState>>;
    /// Returns the id of the new thread.
    async fn create_thread(&self, thread: &NewThread) -> Result<String>;
    async fn ingest_file(&self, assistant_id: &str, file: FileUpload) -> Result<()>;
}
